//! Main extraction logic for detail and listing pages.

mod flashvars;
mod links;
mod stats;
mod values;

use std::convert::Infallible;
use std::str::FromStr;

pub use self::flashvars::Flashvars;
pub use self::links::{Links, TermKind};
pub use self::stats::Stats;
use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::{Quality, Rendition, SearchResult, Term, VideoAddress, VideoRecord};
use exn::OptionExt;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

use self::values::{clean_text, clean_url, quality_from_url};

#[derive(Debug)]
pub struct Extractor {
    document: Html,
    hint: Option<VideoAddress>,
}
impl Extractor {
    pub fn from_document(document: Html) -> Self {
        Self { document, hint: None }
    }

    pub fn from_html(html: &str) -> Self {
        Self::from_document(Html::parse_document(html))
    }

    /// Accepts raw bytes; invalid UTF-8 sequences are replaced with U+FFFD.
    pub fn from_bytes(html: &[u8]) -> Self {
        Self::from_html(&String::from_utf8_lossy(html))
    }

    /// The address the page was requested with. Used when the page itself
    /// does not state its ID and slug.
    pub fn with_address(mut self, address: VideoAddress) -> Self {
        self.hint = Some(address);
        self
    }

    /// Returns `true` when the site served its "no such video" page.
    pub fn is_not_found(&self) -> bool {
        let title = self.first_text(&consts::TITLE_SELECTOR).unwrap_or_default();
        title.starts_with("404")
            || self
                .document
                .root_element()
                .text()
                .any(|text| text.contains("Video not found") || text.contains("Page not found"))
    }

    /// Extracts the metadata of a single-video page.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotFound`] if the page reports that the video does not exist.
    /// - [`ErrorKind::MissingField`] if the ID, slug, title or every rendition is
    ///   absent. Optional fields never fail the extraction.
    #[instrument(skip(self), fields(hint = ?self.hint))]
    pub fn record(&self) -> Result<VideoRecord> {
        if self.is_not_found() {
            exn::bail!(ErrorKind::NotFound);
        }
        let flashvars = Flashvars::new(&self.document);
        let address = self.address(&flashvars)?;
        let slug = address.slug.ok_or_raise(|| ErrorKind::MissingField("slug"))?;
        let title = self.title().ok_or_raise(|| ErrorKind::MissingField("title"))?;
        let renditions = self.renditions(&flashvars);
        if renditions.is_empty() {
            exn::bail!(ErrorKind::MissingField("renditions"));
        }
        let stats = Stats::new(&self.document, &flashvars);
        let links = Links::new(&self.document);
        Ok(VideoRecord {
            id: address.id,
            slug,
            title,
            duration_seconds: stats.duration(),
            views: stats.views(),
            likes: stats.likes(),
            dislikes: stats.dislikes(),
            upload_date: stats.upload_date(),
            uploader: self.uploader(&links, &flashvars),
            thumbnail: self.thumbnail(&flashvars),
            tags: links.term_names(TermKind::Tag),
            category: links.first_term_name(TermKind::Category),
            renditions,
        })
    }

    /// Collects the videos linked from a listing page (search results, home
    /// page, tag or category pages). An empty listing is not an error.
    #[instrument(skip(self))]
    pub fn listing(&self, query: &str) -> Result<SearchResult> {
        if self.first_text(&consts::TITLE_SELECTOR).is_some_and(|t| t.starts_with("404")) {
            exn::bail!(ErrorKind::NotFound);
        }
        let addresses = Links::new(&self.document).videos();
        debug!(count = addresses.len(), "collected listing addresses");
        Ok(SearchResult::new(query, addresses))
    }

    /// Entries of a tag or category index page.
    pub fn terms(&self, kind: TermKind) -> Vec<Term> {
        Links::new(&self.document).terms(kind)
    }

    fn first_attr(&self, selector: &Selector, attr: &str) -> Option<&str> {
        self.document
            .select(selector)
            .find_map(|el| el.value().attr(attr))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn first_text(&self, selector: &Selector) -> Option<String> {
        self.document
            .select(selector)
            .map(|el| clean_text(&el.text().collect::<String>()))
            .find(|v| !v.is_empty())
    }

    /// ID and slug as stated by the page, otherwise as requested.
    fn address(&self, flashvars: &Flashvars) -> Result<VideoAddress> {
        let stated = [
            self.first_attr(&consts::CANONICAL_SELECTOR, "href"),
            self.first_attr(&consts::OG_URL_SELECTOR, "content"),
        ];
        let mut bare_id = None;
        for url in stated.into_iter().flatten() {
            if let Some(captures) = consts::VIDEO_PATH_REGEX.captures(url)
                && let Some(id) = captures.get(1).and_then(|m| m.as_str().parse::<u64>().ok())
            {
                match captures.get(2) {
                    Some(slug) => return Ok(VideoAddress::new(id, slug.as_str())),
                    None => bare_id = bare_id.or(Some(id)),
                }
            }
        }
        let player_id = flashvars.get("video_id").and_then(|id| id.parse::<u64>().ok());
        match (&self.hint, bare_id.or(player_id)) {
            (Some(hint), Some(id)) if hint.id == id => Ok(hint.clone()),
            (Some(hint), None) => Ok(hint.clone()),
            (_, Some(id)) => Ok(VideoAddress::bare(id)),
            (None, None) => exn::bail!(ErrorKind::MissingField("id")),
        }
    }

    fn title(&self) -> Option<String> {
        self.first_attr(&consts::OG_TITLE_SELECTOR, "content")
            .map(clean_text)
            .filter(|t| !t.is_empty())
            .or_else(|| self.first_text(&consts::HEADING_SELECTOR))
            .or_else(|| {
                let title = self.first_text(&consts::TITLE_SELECTOR)?;
                let title = consts::TITLE_SUFFIX_REGEX.replace(&title, "").trim().to_string();
                (!title.is_empty()).then_some(title)
            })
    }

    fn thumbnail(&self, flashvars: &Flashvars) -> Option<String> {
        [
            self.first_attr(&consts::OG_IMAGE_SELECTOR, "content"),
            self.first_attr(&consts::POSTER_SELECTOR, "poster"),
            flashvars.first_of(&["preview_url", "poster"]),
        ]
        .into_iter()
        .flatten()
        .find_map(clean_url)
    }

    fn uploader(&self, links: &Links<'_>, flashvars: &Flashvars) -> Option<String> {
        links
            .uploader()
            .or_else(|| self.first_text(&consts::UPLOADER_TEXT_SELECTOR))
            .or_else(|| flashvars.first_of(&["uploader", "author"]).map(clean_text))
    }

    /// Renditions from the player configuration, then `<source>` elements,
    /// then any `.mp4` link in the page. Highest quality first, one URL per
    /// quality (the first one found).
    fn renditions(&self, flashvars: &Flashvars) -> Vec<Rendition> {
        let mut found: Vec<Rendition> = Vec::new();
        for (label, url) in flashvars.renditions() {
            add_rendition(&mut found, Some(label), url);
        }
        for source in self.document.select(&consts::SOURCE_SELECTOR) {
            let element = source.value();
            if let Some(url) = element.attr("src") {
                add_rendition(&mut found, element.attr("label").or(element.attr("title")), url);
            }
        }
        if found.is_empty() {
            let scripts = self.document.select(&consts::SCRIPT_SELECTOR).map(|s| s.text().collect::<String>());
            let hrefs = self
                .document
                .select(&consts::ANCHOR_SELECTOR)
                .filter_map(|a| a.value().attr("href").map(str::to_string));
            for text in scripts.chain(hrefs) {
                for url in consts::MP4_URL_REGEX.find_iter(&text) {
                    add_rendition(&mut found, None, url.as_str());
                }
            }
        }
        found.sort_by(|a, b| b.quality.cmp(&a.quality));
        found
    }
}
impl FromStr for Extractor {
    type Err = Infallible;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_html(s))
    }
}
impl From<String> for Extractor {
    fn from(value: String) -> Self {
        Self::from_html(&value)
    }
}
impl From<Html> for Extractor {
    fn from(document: Html) -> Self {
        Self::from_document(document)
    }
}

fn add_rendition(found: &mut Vec<Rendition>, label: Option<&str>, url: &str) {
    let Some(url) = clean_url(url) else {
        debug!(url, "skipping rendition with unusable URL");
        return;
    };
    // Labels look like "720p", "720p HD" or "4K"; fall back to the file name.
    let quality = label
        .and_then(|l| l.split_whitespace().next())
        .and_then(|l| l.parse::<Quality>().ok())
        .or_else(|| quality_from_url(&url));
    match quality {
        Some(quality) if !found.iter().any(|r| r.quality == quality) => found.push(Rendition::new(quality, url)),
        Some(_) => {}
        None => debug!(%url, ?label, "skipping rendition with unknown quality"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::UploadDate;
    use std::collections::BTreeSet;
    use time::macros::date;

    const DETAIL: &str = include_str!("../../fixtures/detail.html");
    const DETAIL_SOURCES: &str = include_str!("../../fixtures/detail_sources.html");
    const DETAIL_MP4_ONLY: &str = include_str!("../../fixtures/detail_mp4_only.html");
    const NOT_FOUND: &str = include_str!("../../fixtures/not_found.html");
    const LISTING: &str = include_str!("../../fixtures/listing_search.html");
    const LISTING_EMPTY: &str = include_str!("../../fixtures/listing_empty.html");
    const CATEGORIES: &str = include_str!("../../fixtures/categories.html");

    #[test]
    fn test_detail_page() {
        let record = Extractor::from_html(DETAIL).record().unwrap();
        assert_eq!(record.id, 3055012);
        assert_eq!(record.slug, "ankha-animation-minus82");
        assert_eq!(record.title, "Ankha animation (minus8)");
        assert_eq!(record.duration_seconds, Some(155));
        assert_eq!(record.views, Some(1_200_000));
        assert_eq!(record.likes, Some(15320));
        assert_eq!(record.dislikes, Some(412));
        assert_eq!(record.upload_date, UploadDate::Known(date!(2024 - 03 - 18)));
        assert_eq!(record.uploader.as_deref(), Some("minus8"));
        assert_eq!(
            record.thumbnail.as_deref(),
            Some("https://rule34video.com/contents/videos_screenshots/3055000/3055012/preview.jpg")
        );
        assert_eq!(
            record.tags,
            BTreeSet::from(["2d", "animated", "ankha", "minus8"].map(String::from))
        );
        assert_eq!(record.category.as_deref(), Some("animal crossing"));
        assert_eq!(
            record.qualities().collect::<Vec<_>>(),
            vec![Quality::P2160, Quality::P1080, Quality::P720, Quality::P360]
        );
        assert_eq!(
            record.renditions[0].url,
            "https://rule34video.com/get_file/3/99ffaa01/3055000/3055012/3055012_2160p.mp4/?br=8122"
        );
    }

    #[test]
    fn test_detail_page_is_idempotent() {
        let first = Extractor::from_html(DETAIL).record().unwrap();
        let second = Extractor::from_bytes(DETAIL.as_bytes()).record().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_detail_page_from_source_elements() {
        let address = VideoAddress::new(1000001, "fox-girl-compilation");
        let record = Extractor::from_html(DETAIL_SOURCES).with_address(address).record().unwrap();
        assert_eq!(record.id, 1000001);
        assert_eq!(record.slug, "fox-girl-compilation");
        assert_eq!(record.title, "Fox girl compilation");
        assert_eq!(
            record.renditions,
            vec![
                Rendition::new(Quality::P720, "https://rule34video.com/get_file/1/abc/1000000/1000001/1000001_720p.mp4/"),
                Rendition::new(Quality::P480, "https://cdn.rule34video.com/remote/1000001/1000001_480p.mp4"),
            ]
        );
        assert_eq!(record.duration_seconds, Some(724));
        assert_eq!(record.views, Some(8421));
        assert_eq!(record.likes, None);
        assert_eq!(record.upload_date, UploadDate::Unknown);
        assert!(record.tags.is_empty());
        assert_eq!(record.category, None);
    }

    #[test]
    fn test_detail_page_from_bare_links() {
        let record = Extractor::from_html(DETAIL_MP4_ONLY).record().unwrap();
        assert_eq!(record.address(), VideoAddress::new(2000002, "direct-links-only"));
        assert_eq!(
            record.renditions,
            vec![
                Rendition::new(Quality::P1080, "https://cdn.example.com/files/2000002/2000002_1080p.mp4?token=abc"),
                Rendition::new(Quality::P480, "https://cdn.example.com/files/2000002/2000002_480p.mp4"),
            ]
        );
    }

    #[test]
    fn test_detail_page_without_address() {
        let err = Extractor::from_html(DETAIL_SOURCES).record().unwrap_err();
        assert_eq!(&*err, &ErrorKind::MissingField("id"));
    }

    #[test]
    fn test_detail_page_without_renditions() {
        let html = r#"<html><head><title>Nothing to play</title>
            <link rel="canonical" href="https://rule34video.com/video/5/nothing-to-play/"></head>
            <body><h1 class="title">Nothing to play</h1></body></html>"#;
        let err = Extractor::from_html(html).record().unwrap_err();
        assert_eq!(&*err, &ErrorKind::MissingField("renditions"));
    }

    #[test]
    fn test_detail_page_without_slug() {
        let html = r#"<html><head><title>Bare</title></head><body>
            <script>var flashvars = { video_id: '77', video_url: 'https://cdn.example.com/77_720p.mp4' };</script>
            </body></html>"#;
        let err = Extractor::from_html(html).record().unwrap_err();
        assert_eq!(&*err, &ErrorKind::MissingField("slug"));
    }

    #[test]
    fn test_not_found_page() {
        let extractor = Extractor::from_html(NOT_FOUND).with_address(VideoAddress::new(9, "gone"));
        assert!(extractor.is_not_found());
        assert_eq!(&*extractor.record().unwrap_err(), &ErrorKind::NotFound);
    }

    #[test]
    fn test_listing_page() {
        let result = Extractor::from_html(LISTING).listing("anime").unwrap();
        assert_eq!(result.query, "anime");
        assert_eq!(
            result.addresses.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![1000101, 1000102, 1000103, 1000104, 1000105, 1000106, 1000107]
        );
        assert!(result.addresses.iter().all(VideoAddress::is_qualified));
        assert_eq!(result.addresses[2], VideoAddress::new(1000103, "anime-beach-episode"));
    }

    #[test]
    fn test_empty_listing_page() {
        let result = Extractor::from_html(LISTING_EMPTY).listing("nothing").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_category_index() {
        let terms = Extractor::from_html(CATEGORIES).terms(TermKind::Category);
        assert_eq!(
            terms.iter().map(|t| (t.slug.as_str(), t.name.as_str())).collect::<Vec<_>>(),
            vec![
                ("animal-crossing", "Animal Crossing"),
                ("overwatch", "Overwatch"),
                ("pokemon", "Pokémon")
            ]
        );
    }
}
