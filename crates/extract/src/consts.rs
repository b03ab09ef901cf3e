use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

/// Scheme and host every page and listing URL is built from.
pub const ROOT_URL: &str = "https://rule34video.com";

const SCHEME_HOST: &str = "^(?:https?://[^/]+)?";
const SAFE_END: &str = "(?:$|\\?|#|/)";

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Identity of the page, used to recover the ID and slug of a detail page.
selector!(CANONICAL_SELECTOR, "link[rel='canonical'][href]");
selector!(OG_URL_SELECTOR, "meta[property='og:url'][content]");
regex!(VIDEO_PATH_REGEX, format!(r"{}/videos?/(\d+)(?:/([^/?#]+))?{}", SCHEME_HOST, SAFE_END).as_str());
regex!(TERM_PATH_REGEX, format!(r"{}/(tags|categories)/([^/?#]+){}", SCHEME_HOST, SAFE_END).as_str());
regex!(MEMBER_PATH_REGEX, format!(r"{}/members/[^/?#]+", SCHEME_HOST).as_str());

selector!(OG_TITLE_SELECTOR, "meta[property='og:title'][content]");
selector!(HEADING_SELECTOR, "h1[class*='title']");
selector!(TITLE_SELECTOR, "title");
regex!(TITLE_SUFFIX_REGEX, r"(?i)\s*[-|]\s*Rule34\s*Video\s*$");

selector!(OG_IMAGE_SELECTOR, "meta[property='og:image'][content]");
selector!(POSTER_SELECTOR, "video[poster]");

selector!(DURATION_META_SELECTOR, "meta[itemprop='duration'][content]");
selector!(DURATION_TEXT_SELECTOR, "span[class*='duration'], div[class*='duration']");
selector!(UPLOAD_DATE_META_SELECTOR, "meta[itemprop='uploadDate'][content]");
selector!(DATE_TEXT_SELECTOR, "span[class*='date'], div[class*='date']");

selector!(VIEWS_DATA_SELECTOR, "[data-views]");
selector!(LIKES_DATA_SELECTOR, "[data-likes]");
selector!(DISLIKES_DATA_SELECTOR, "[data-dislikes]");
selector!(VIEWS_TEXT_SELECTOR, "span.views, div.views span");
selector!(LIKES_TEXT_SELECTOR, "span.like-count");
selector!(DISLIKES_TEXT_SELECTOR, "span.dislike-count");

selector!(ANCHOR_SELECTOR, "a[href]");
selector!(UPLOADER_TEXT_SELECTOR, "span[class*='uploader']");
selector!(SOURCE_SELECTOR, "source[src]");
selector!(SCRIPT_SELECTOR, "script");

// Player configuration: `var flashvars = { key: 'value', ... };`
regex!(FLASHVARS_REGEX, r"(?s)flashvars\s*=\s*\{([^}]*)\}");
regex!(FLASHVAR_REGEX, r#"([A-Za-z0-9_]+)\s*:\s*(?:'([^']*)'|"([^"]*)"|(\d+))"#);
regex!(MP4_URL_REGEX, r#"https?://[^\s"'<>]+?\.mp4[^\s"'<>]*"#);
regex!(URL_QUALITY_REGEX, r"(?i)[_/](\d{3,4})p?\.mp4");
regex!(FUNCTION_PREFIX_REGEX, r"^function/\d+/");
regex!(REPEATED_SLASH_REGEX, r"([^:/])//+");

regex!(ISO_DURATION_REGEX, r"(?i)^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?$");
regex!(CLOCK_DURATION_REGEX, r"^(\d+):(\d{1,2})(?::(\d{1,2}))?$");
regex!(COUNT_REGEX, r"(?i)^(\d+(?:\.\d+)?)([KMB])?$");

regex!(ISO_DATE_REGEX, r"\b(\d{4})-(\d{1,2})-(\d{1,2})");
regex!(DAY_MONTH_DATE_REGEX, r"(?i)\b(\d{1,2})\s+([a-z]{3})[a-z]*\.?,?\s+(\d{4})\b");
regex!(MONTH_DAY_DATE_REGEX, r"(?i)\b([a-z]{3})[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b");
regex!(WHITESPACE_REGEX, r"\s+");
