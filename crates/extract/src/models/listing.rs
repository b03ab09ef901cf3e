use time::OffsetDateTime;

use super::VideoAddress;

/// Ordered addresses discovered on a listing page (search results, latest,
/// popular, tag and category pages all share this shape).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResult {
    /// What produced the listing (search terms, tag, category, ...)
    pub query: String,
    /// Addresses in page order, de-duplicated by ID
    pub addresses: Vec<VideoAddress>,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub fetched_at: OffsetDateTime,
}
impl SearchResult {
    pub fn new(query: impl Into<String>, addresses: Vec<VideoAddress>) -> Self {
        Self {
            query: query.into(),
            addresses,
            fetched_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Keep at most `limit` addresses.
    pub fn truncate(mut self, limit: usize) -> Self {
        self.addresses.truncate(limit);
        self
    }
}

/// A browsable taxonomy entry (category or tag) from an index page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Term {
    /// Path segment used in `/categories/{slug}/`
    pub slug: String,
    /// Display name
    pub name: String,
}
