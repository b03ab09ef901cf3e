//! Listing and index page URLs.

use r34v_extract::ROOT_URL;
use rslug::slugify;

/// Site listing pages take a 1-based page number; page 1 needs no parameter.
fn with_page(url: String, parameter: &str, page: u32) -> String {
    if page <= 1 {
        return url;
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{parameter}={page}")
}

/// Term slugs as the site spells them, e.g. `Big Ears` is `big-ears`.
pub(crate) fn term_slug(term: &str) -> String {
    slugify!(term.trim())
}

pub(crate) fn search(query: &str, page: u32) -> String {
    let query = query.trim();
    if query.is_empty() {
        return latest(page);
    }
    with_page(format!("{ROOT_URL}/search/{}/", urlencoding::encode(query)), "from", page)
}

pub(crate) fn latest(page: u32) -> String {
    with_page(format!("{ROOT_URL}/"), "from", page)
}

pub(crate) fn popular(page: u32) -> String {
    with_page(format!("{ROOT_URL}/?sort_by=most_viewed"), "from", page)
}

pub(crate) fn by_tag(tag: &str, page: u32) -> String {
    with_page(format!("{ROOT_URL}/tags/{}/", term_slug(tag)), "page", page)
}

pub(crate) fn by_category(category: &str, page: u32) -> String {
    with_page(format!("{ROOT_URL}/categories/{}/", term_slug(category)), "page", page)
}

pub(crate) fn tags(page: u32) -> String {
    with_page(format!("{ROOT_URL}/tags/"), "page", page)
}

pub(crate) fn categories() -> String {
    format!("{ROOT_URL}/categories/")
}

/// Pages sampled by the random operation, in order.
pub(crate) fn random() -> [String; 2] {
    [format!("{ROOT_URL}/?random=1"), latest(1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(search("anime", 1), "https://rule34video.com/search/anime/")]
    #[case(search("big ears", 3), "https://rule34video.com/search/big%20ears/?from=3")]
    #[case(search("  ", 1), "https://rule34video.com/")]
    #[case(latest(0), "https://rule34video.com/")]
    #[case(latest(2), "https://rule34video.com/?from=2")]
    #[case(popular(1), "https://rule34video.com/?sort_by=most_viewed")]
    #[case(popular(4), "https://rule34video.com/?sort_by=most_viewed&from=4")]
    #[case(by_tag("Big Ears", 1), "https://rule34video.com/tags/big-ears/")]
    #[case(by_category("animal-crossing", 2), "https://rule34video.com/categories/animal-crossing/?page=2")]
    #[case(tags(2), "https://rule34video.com/tags/?page=2")]
    #[case(categories(), "https://rule34video.com/categories/")]
    fn test_urls(#[case] actual: String, #[case] expected: &str) {
        assert_eq!(actual, expected);
    }
}
