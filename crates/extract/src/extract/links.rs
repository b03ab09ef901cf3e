use std::collections::{BTreeSet, HashSet};

use scraper::Html;

use super::values::{clean_text, normalize_term};
use crate::consts;
use crate::models::{Term, VideoAddress};

/// Browsable taxonomies that have their own index and listing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    Tag,
    Category,
}
impl TermKind {
    /// Path segment of the index page, `/tags/` or `/categories/`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            TermKind::Tag => "tags",
            TermKind::Category => "categories",
        }
    }
}

/// Anchors of a page, classified by the kind of site path they point to.
#[derive(Debug)]
pub struct Links<'a> {
    anchors: Vec<(&'a str, String)>,
}
impl<'a> Links<'a> {
    pub(crate) fn new(document: &'a Html) -> Self {
        let anchors = document
            .select(&consts::ANCHOR_SELECTOR)
            .filter_map(|a| {
                let href = a.value().attr("href")?.trim();
                Some((href, clean_text(&a.text().collect::<String>())))
            })
            .collect();
        Self { anchors }
    }

    fn terms_of(&self, kind: TermKind) -> impl Iterator<Item = (&str, &str)> {
        self.anchors.iter().filter_map(move |(href, text)| {
            let captures = consts::TERM_PATH_REGEX.captures(href)?;
            let slug = captures.get(2)?.as_str();
            (captures.get(1)?.as_str() == kind.path_segment()).then_some((slug, text.as_str()))
        })
    }

    /// Normalized names of every linked term of `kind`.
    pub fn term_names(&self, kind: TermKind) -> BTreeSet<String> {
        self.terms_of(kind).filter_map(|(_, text)| normalize_term(text)).collect()
    }

    /// Normalized name of the first linked term of `kind` on the page.
    pub fn first_term_name(&self, kind: TermKind) -> Option<String> {
        self.terms_of(kind).find_map(|(_, text)| normalize_term(text))
    }

    /// Index entries of `kind`, de-duplicated by slug, in page order.
    pub fn terms(&self, kind: TermKind) -> Vec<Term> {
        let mut seen = HashSet::new();
        self.terms_of(kind)
            .filter(|(_, text)| !text.is_empty())
            .filter(|(slug, _)| seen.insert(slug.to_string()))
            .map(|(slug, name)| Term {
                slug: slug.to_string(),
                name: name.to_string(),
            })
            .collect()
    }

    /// Display name of the first linked member profile.
    pub fn uploader(&self) -> Option<String> {
        self.anchors
            .iter()
            .filter(|(href, _)| consts::MEMBER_PATH_REGEX.is_match(href))
            .map(|(_, text)| text.clone())
            .find(|text| !text.is_empty())
    }

    /// Linked videos that carry a slug, de-duplicated by ID in page order.
    ///
    /// Links without a slug are skipped: their detail pages cannot be
    /// addressed without one.
    pub fn videos(&self) -> Vec<VideoAddress> {
        let mut seen = HashSet::new();
        let mut addresses = Vec::new();
        for (href, _) in &self.anchors {
            if let Some(captures) = consts::VIDEO_PATH_REGEX.captures(href)
                && let Some(id) = captures.get(1).and_then(|m| m.as_str().parse::<u64>().ok())
                && let Some(slug) = captures.get(2)
                && seen.insert(id)
            {
                addresses.push(VideoAddress::new(id, slug.as_str()));
            }
        }
        addresses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <nav><a href="/categories/">All categories</a><a href="/tags/">Tags</a></nav>
        <div class="thumbs">
            <a href="https://rule34video.com/video/3055012/ankha-animation-minus82/">Ankha</a>
            <a href="/videos/3055013/second-video/">Second</a>
            <a href="/video/3055012/ankha-animation-minus82/?utm=1">Ankha again</a>
            <a href="/video/3055014/">No slug</a>
            <a href="/video/abc/not-a-video/">Broken</a>
        </div>
        <div class="tags">
            <a href="/tags/big-ears/"> Big  Ears </a>
            <a href="/tags/fox/">FOX</a>
            <a href="/tags/fox/">fox</a>
            <a href="/categories/animation/">Animation</a>
        </div>
        <a href="/members/12345/">  Minus8 </a>
    "#;

    #[test]
    fn test_videos_are_deduplicated_in_page_order() {
        let document = Html::parse_document(PAGE);
        let addresses = Links::new(&document).videos();
        assert_eq!(
            addresses,
            vec![
                VideoAddress::new(3055012, "ankha-animation-minus82"),
                VideoAddress::new(3055013, "second-video"),
            ]
        );
    }

    #[test]
    fn test_term_names_are_normalized() {
        let document = Html::parse_document(PAGE);
        let links = Links::new(&document);
        assert_eq!(
            links.term_names(TermKind::Tag).into_iter().collect::<Vec<_>>(),
            vec!["big ears".to_string(), "fox".to_string()]
        );
        assert_eq!(
            links.term_names(TermKind::Category).into_iter().collect::<Vec<_>>(),
            vec!["animation".to_string()]
        );
    }

    #[test]
    fn test_first_term_keeps_page_order() {
        let document = Html::parse_document(
            r#"<a href="/categories/zelda/">Zelda</a><a href="/categories/animal-crossing/">Animal Crossing</a>"#,
        );
        let links = Links::new(&document);
        assert_eq!(links.first_term_name(TermKind::Category).as_deref(), Some("zelda"));
        assert_eq!(links.first_term_name(TermKind::Tag), None);
    }

    #[test]
    fn test_terms_index() {
        let document = Html::parse_document(PAGE);
        let terms = Links::new(&document).terms(TermKind::Tag);
        assert_eq!(
            terms,
            vec![
                Term {
                    slug: "big-ears".to_string(),
                    name: "Big Ears".to_string()
                },
                Term {
                    slug: "fox".to_string(),
                    name: "FOX".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_uploader() {
        let document = Html::parse_document(PAGE);
        assert_eq!(Links::new(&document).uploader().as_deref(), Some("Minus8"));
    }
}
