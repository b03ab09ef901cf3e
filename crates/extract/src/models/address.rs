use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::consts::{ROOT_URL, VIDEO_PATH_REGEX};

/// Where a video lives on the site.
///
/// The numeric `id` alone is not enough to build a working page URL; the site
/// only serves detail pages at `/video/{id}/{slug}/`. An address without a
/// slug is a *bare* address and has to be completed from an earlier listing
/// before it can be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VideoAddress {
    /// Numeric video ID
    pub id: u64,
    /// URL slug (title-derived path segment)
    pub slug: Option<String>,
}
impl VideoAddress {
    pub fn new(id: u64, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        let slug = slug.trim_matches('/').to_string();
        Self {
            id,
            slug: (!slug.is_empty()).then_some(slug),
        }
    }

    pub fn bare(id: u64) -> Self {
        Self { id, slug: None }
    }

    pub fn is_qualified(&self) -> bool {
        self.slug.is_some()
    }

    /// Parse a detail page URL or path, e.g. `/video/{id}/{slug}/`.
    ///
    /// Both `/video/` and `/videos/` are accepted; the host is not checked.
    pub fn from_url(url: &str) -> Option<Self> {
        let captures = VIDEO_PATH_REGEX.captures(url.trim())?;
        let id = captures.get(1)?.as_str().parse().ok()?;
        Some(match captures.get(2) {
            Some(slug) => Self::new(id, slug.as_str()),
            None => Self::bare(id),
        })
    }

    /// Detail page URL, or `None` for a bare address.
    pub fn page_url(&self) -> Option<String> {
        self.slug.as_ref().map(|slug| format!("{ROOT_URL}/video/{}/{slug}/", self.id))
    }
}
impl From<(u64, String)> for VideoAddress {
    fn from((id, slug): (u64, String)) -> Self {
        Self::new(id, slug)
    }
}
impl Display for VideoAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.slug {
            Some(slug) => write!(f, "{}/{slug}", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}
