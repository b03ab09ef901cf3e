mod consts;
pub mod error;
mod extract;
pub mod models;

use tracing::instrument;

pub use crate::consts::ROOT_URL;
use crate::error::Result;
pub use crate::extract::{Extractor, Flashvars, Links, Stats, TermKind};
use crate::models::{SearchResult, Term, VideoAddress, VideoRecord};

/// Easy, top-level entrypoint for the extraction of a [`VideoRecord`] from
/// the raw bytes of a detail page.
///
/// `address` is the address the page was requested with; it fills in the ID
/// and slug when the page does not state them itself. Invalid UTF-8 sequences
/// are replaced with U+FFFD during parsing. See [`Extractor`] for details.
#[instrument(skip(html), fields(html_size = html.as_ref().len()))]
pub fn parse_detail(html: impl AsRef<[u8]>, address: Option<&VideoAddress>) -> Result<VideoRecord> {
    let extractor = Extractor::from_bytes(html.as_ref());
    match address {
        Some(address) => extractor.with_address(address.clone()).record(),
        None => extractor.record(),
    }
}

/// Extraction of the [`SearchResult`] of any listing page; `query` describes
/// what produced the listing.
#[instrument(skip(html), fields(html_size = html.as_ref().len()))]
pub fn parse_listing(html: impl AsRef<[u8]>, query: &str) -> Result<SearchResult> {
    Extractor::from_bytes(html.as_ref()).listing(query)
}

/// Extraction of a tag or category index page.
#[instrument(skip(html), fields(html_size = html.as_ref().len()))]
pub fn parse_terms(html: impl AsRef<[u8]>, kind: TermKind) -> Vec<Term> {
    Extractor::from_bytes(html.as_ref()).terms(kind)
}
