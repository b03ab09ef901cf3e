use scraper::{Html, Selector};
use tracing::{instrument, warn};

use super::Flashvars;
use super::values::{clean_text, parse_count, parse_date, parse_duration};
use crate::consts;
use crate::models::UploadDate;

/// Optional statistics of a detail page.
///
/// Each value is looked up in the player configuration first, then in
/// structured markup, then in visible text. A value that is present but cannot
/// be understood is logged and treated as unknown.
#[derive(Debug)]
pub struct Stats<'a> {
    document: &'a Html,
    flashvars: &'a Flashvars,
}
impl<'a> Stats<'a> {
    pub(crate) fn new(document: &'a Html, flashvars: &'a Flashvars) -> Self {
        Self { document, flashvars }
    }

    fn attr(&self, selector: &Selector, attr: &str) -> Option<&'a str> {
        self.document
            .select(selector)
            .find_map(|el| el.value().attr(attr))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn text(&self, selector: &Selector) -> Option<String> {
        self.document
            .select(selector)
            .map(|el| clean_text(&el.text().collect::<String>()))
            .find(|v| !v.is_empty())
    }

    fn count(&self, field: &'static str, data: &Selector, text: &Selector) -> Option<u64> {
        let candidates = [
            self.flashvars.get(field).map(str::to_string),
            self.attr(data, &format!("data-{field}")).map(str::to_string),
            self.text(text),
        ];
        first_parsed(field, candidates.into_iter().flatten(), parse_count)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn views(&self) -> Option<u64> {
        self.count("views", &consts::VIEWS_DATA_SELECTOR, &consts::VIEWS_TEXT_SELECTOR)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn likes(&self) -> Option<u64> {
        self.count("likes", &consts::LIKES_DATA_SELECTOR, &consts::LIKES_TEXT_SELECTOR)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn dislikes(&self) -> Option<u64> {
        self.count("dislikes", &consts::DISLIKES_DATA_SELECTOR, &consts::DISLIKES_TEXT_SELECTOR)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn duration(&self) -> Option<u64> {
        let candidates = [
            self.attr(&consts::DURATION_META_SELECTOR, "content").map(str::to_string),
            self.flashvars.get("duration").map(str::to_string),
            self.text(&consts::DURATION_TEXT_SELECTOR),
        ];
        first_parsed("duration", candidates.into_iter().flatten(), parse_duration)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn upload_date(&self) -> UploadDate {
        let candidates = [
            self.flashvars
                .first_of(&["upload_date", "date", "post_date", "added", "created"])
                .map(str::to_string),
            self.attr(&consts::UPLOAD_DATE_META_SELECTOR, "content").map(str::to_string),
            self.text(&consts::DATE_TEXT_SELECTOR),
        ];
        first_parsed("upload_date", candidates.into_iter().flatten(), parse_date).into()
    }
}

/// The first candidate that parses. Unparseable candidates are skipped, and
/// only reported when none of them could be used.
fn first_parsed<T>(
    field: &'static str,
    candidates: impl Iterator<Item = String>,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let mut rejected = Vec::new();
    for candidate in candidates {
        match parse(&candidate) {
            Some(value) => return Some(value),
            None => rejected.push(candidate),
        }
    }
    if !rejected.is_empty() {
        warn!(field, values = ?rejected, "could not parse optional field, treating it as unknown");
    }
    None
}
