//! Turns video references into records, listings, direct links and censored
//! thumbnails.
//!
//! Every listing a [`Client`] returns teaches it the slug of each address in
//! it, which is what lets a bare numeric ID be used afterwards. Records and
//! those id→slug mappings share one TTL-bounded [`CacheStore`], and
//! concurrent requests for the same uncached video share a single fetch.

pub mod error;
mod negotiate;
mod reference;
mod settings;
mod urls;

use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use exn::{OptionExt, ResultExt};
use r34v_cache::CacheStore;
use r34v_config::Config;
use r34v_extract::{
    TermKind,
    models::{QualityRequest, Rendition, SearchResult, Term, VideoAddress, VideoRecord},
};
use r34v_thumbnail::{Level, ThumbnailAsset};
use r34v_transport::{HttpOptions, HttpTransport, TransportHandle};
use rand::seq::SliceRandom;
use tracing::{debug, instrument, warn};

use crate::error::{ErrorKind, Result};
pub use crate::negotiate::select;
pub use crate::reference::Reference;
pub use crate::settings::Settings;

/// Payloads of the shared cache table.
///
/// Records live under `record:{id}`, slugs learned from listings and
/// qualified references under `resolve:{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cached {
    Record(Arc<VideoRecord>),
    Slug(String),
}

pub type ClientCache = CacheStore<Cached, ErrorKind>;

fn record_key(id: u64) -> String {
    format!("record:{id}")
}

fn resolve_key(id: u64) -> String {
    format!("resolve:{id}")
}

/// Entry point for every request kind.
///
/// Clones are cheap and share the transport and the cache.
#[derive(Clone)]
pub struct Client {
    transport: TransportHandle,
    cache: ClientCache,
    settings: Settings,
}

impl Client {
    pub fn new(transport: TransportHandle, settings: Settings) -> Self {
        Self::with_cache(transport, settings, ClientCache::new())
    }

    /// Use an existing cache table, e.g. one driven by a manual clock.
    pub fn with_cache(transport: TransportHandle, settings: Settings, cache: ClientCache) -> Self {
        Self { transport, cache, settings }
    }

    /// An HTTP-backed client honouring the configured proxy and timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = Settings::from_config(config)?;
        let options = HttpOptions {
            proxy: config.proxy().map(str::to_string),
            timeout: config.request_timeout(),
            ..HttpOptions::default()
        };
        let transport = HttpTransport::new(&options)
            .or_raise(|| ErrorKind::TransportFailed("could not build the HTTP client".to_string()))?;
        Ok(Self::new(Arc::new(transport), settings))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &ClientCache {
        &self.cache
    }

    /// Turn a reference into a fetchable address.
    ///
    /// Qualified references always succeed and record their slug; bare IDs
    /// succeed only while an unexpired mapping for them exists.
    #[instrument(skip(self))]
    pub fn resolve(&self, reference: &str) -> Result<VideoAddress> {
        match reference.parse::<Reference>()? {
            Reference::Qualified(address) => {
                self.remember(&address);
                Ok(address)
            },
            Reference::Bare(id) => match self.cache.get(&resolve_key(id)) {
                Some(Cached::Slug(slug)) => {
                    debug!(id, slug, "resolved bare id");
                    Ok(VideoAddress::new(id, slug))
                },
                _ => exn::bail!(ErrorKind::UnknownId(id)),
            },
        }
    }

    fn remember(&self, address: &VideoAddress) {
        if let Some(slug) = &address.slug {
            self.cache.put(resolve_key(address.id), Cached::Slug(slug.clone()), self.settings.ttl());
        }
    }

    /// Metadata of the referenced video.
    pub async fn detail(&self, reference: &str) -> Result<Arc<VideoRecord>> {
        let address = self.resolve(reference)?;
        self.record(&address).await
    }

    /// Metadata of a qualified address, from the cache or a single shared fetch.
    #[instrument(skip(self, address), fields(%address))]
    pub async fn record(&self, address: &VideoAddress) -> Result<Arc<VideoRecord>> {
        if !address.is_qualified() {
            exn::bail!(ErrorKind::UnknownId(address.id));
        }
        let transport = Arc::clone(&self.transport);
        let target = address.clone();
        let cached = self
            .cache
            .get_or_fetch(&record_key(address.id), self.settings.ttl(), move || fetch_record(transport, target))
            .await
            .map_err(exn::Exn::from)?;
        let Cached::Record(record) = cached else {
            exn::bail!(ErrorKind::ParseFailed(format!("cache entry for video {} is not a record", address.id)));
        };
        self.remember(&record.address());
        Ok(record)
    }

    /// A playable link for the referenced video.
    ///
    /// Without a `quality` token the configured default is used.
    #[instrument(skip(self))]
    pub async fn direct_url(&self, reference: &str, quality: Option<&str>) -> Result<Rendition> {
        let requested = match quality {
            Some(token) => token
                .parse::<QualityRequest>()
                .or_raise(|| ErrorKind::QualityNotAvailable(token.trim().to_string()))?,
            None => self.settings.default_quality,
        };
        let record = self.detail(reference).await?;
        Ok(select(&record.renditions, requested)?.clone())
    }

    /// The referenced video's preview image, censored at the given levels
    /// (or the configured defaults).
    #[instrument(skip(self))]
    pub async fn thumbnail(&self, reference: &str, mosaic: Option<Level>, blur: Option<Level>) -> Result<ThumbnailAsset> {
        let record = self.detail(reference).await?;
        let url = record.thumbnail.clone().ok_or_raise(|| ErrorKind::NoThumbnail(record.id))?;
        let source = self.fetch(&url).await?;
        let mosaic = mosaic.unwrap_or(self.settings.mosaic_level);
        let blur = blur.unwrap_or(self.settings.blur_level);
        tokio::task::spawn_blocking(move || ThumbnailAsset::new(source, mosaic, blur))
            .await
            .or_raise(|| ErrorKind::Aborted("thumbnail processing".to_string()))
    }

    pub async fn search(&self, query: &str, page: u32, limit: Option<usize>) -> Result<SearchResult> {
        self.listing(urls::search(query, page), query.trim(), limit).await
    }

    pub async fn latest(&self, page: u32, limit: Option<usize>) -> Result<SearchResult> {
        self.listing(urls::latest(page), "latest", limit).await
    }

    pub async fn popular(&self, page: u32, limit: Option<usize>) -> Result<SearchResult> {
        self.listing(urls::popular(page), "popular", limit).await
    }

    pub async fn by_tag(&self, tag: &str, page: u32, limit: Option<usize>) -> Result<SearchResult> {
        let query = format!("tag:{}", urls::term_slug(tag));
        self.listing(urls::by_tag(tag, page), &query, limit).await
    }

    pub async fn by_category(&self, category: &str, page: u32, limit: Option<usize>) -> Result<SearchResult> {
        let query = format!("category:{}", urls::term_slug(category));
        self.listing(urls::by_category(category, page), &query, limit).await
    }

    /// Metadata of a video picked at random from the front page listings.
    ///
    /// Every video linked from those pages is a candidate; only the chosen
    /// one has its slug remembered.
    #[instrument(skip(self))]
    pub async fn random(&self) -> Result<Arc<VideoRecord>> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for url in urls::random() {
            match self.page(&url, "random").await {
                Ok(result) => candidates.extend(result.addresses.into_iter().filter(|a| seen.insert(a.id))),
                Err(err) => warn!(error = ?err, "random listing unavailable"),
            }
        }
        let address = candidates.choose(&mut rand::thread_rng()).cloned();
        let address = address.ok_or_raise(|| ErrorKind::NotFound)?;
        debug!(%address, candidates = candidates.len(), "picked random video");
        self.record(&address).await
    }

    /// Normalized tags of the referenced video.
    pub async fn video_tags(&self, reference: &str) -> Result<BTreeSet<String>> {
        let record = self.detail(reference).await?;
        Ok(record.tags.clone())
    }

    /// The site-wide tag index.
    pub async fn tag_index(&self, page: u32) -> Result<Vec<Term>> {
        self.terms(urls::tags(page), TermKind::Tag).await
    }

    pub async fn categories(&self) -> Result<Vec<Term>> {
        self.terms(urls::categories(), TermKind::Category).await
    }

    #[instrument(skip(self))]
    async fn listing(&self, url: String, query: &str, limit: Option<usize>) -> Result<SearchResult> {
        let result = self.page(&url, query).await?;
        let result = result.truncate(self.settings.listing_limit(limit));
        for address in &result.addresses {
            self.remember(address);
        }
        debug!(count = result.len(), "listing fetched");
        Ok(result)
    }

    /// Every video linked from a listing page, untruncated and unremembered.
    async fn page(&self, url: &str, query: &str) -> Result<SearchResult> {
        let body = self.fetch(url).await?;
        r34v_extract::parse_listing(&body, query).map_err(|err| {
            let kind = ErrorKind::from(&*err);
            err.raise(kind)
        })
    }

    async fn terms(&self, url: String, kind: TermKind) -> Result<Vec<Term>> {
        let body = self.fetch(&url).await?;
        Ok(r34v_extract::parse_terms(&body, kind))
    }

    #[instrument(skip(self), fields(transport = self.transport.name()))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.transport.fetch(url).await.map_err(|err| {
            let kind = ErrorKind::from(&*err);
            err.raise(kind)
        })
    }
}

/// Fetch and parse one detail page; runs detached inside the cache.
#[instrument(skip(transport, address), fields(transport = transport.name(), %address))]
async fn fetch_record(transport: TransportHandle, address: VideoAddress) -> std::result::Result<Cached, ErrorKind> {
    let url = address.page_url().ok_or(ErrorKind::UnknownId(address.id))?;
    let body = transport.fetch(&url).await.map_err(|err| {
        warn!(error = ?err, "detail page fetch failed");
        ErrorKind::from(&*err)
    })?;
    let record = r34v_extract::parse_detail(&body, Some(&address)).map_err(|err| {
        warn!(error = ?err, "detail page could not be parsed");
        ErrorKind::from(&*err)
    })?;
    Ok(Cached::Record(Arc::new(record)))
}
