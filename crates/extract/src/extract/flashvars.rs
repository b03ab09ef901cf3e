use std::collections::HashMap;

use scraper::Html;

use crate::consts;

/// Player keys that carry a video URL, paired with the key holding its label,
/// in the order the player lists them.
const RENDITION_KEYS: [(&str, &str); 4] = [
    ("video_url", "video_url_text"),
    ("video_alt_url", "video_alt_url_text"),
    ("video_alt_url2", "video_alt_url2_text"),
    ("video_alt_url3", "video_alt_url3_text"),
];

/// Key/value pairs from the embedded player configuration.
///
/// Detail pages configure their player with an inline script of the form
/// `var flashvars = { video_id: '3055012', video_url: '...', ... };`, which is
/// the most reliable source of renditions and statistics on the page.
#[derive(Debug, Default)]
pub struct Flashvars {
    values: HashMap<String, String>,
}
impl Flashvars {
    pub(crate) fn new(document: &Html) -> Self {
        let mut values = HashMap::new();
        for script in document.select(&consts::SCRIPT_SELECTOR) {
            let text = script.text().collect::<String>();
            let Some(body) = consts::FLASHVARS_REGEX.captures(&text).and_then(|c| c.get(1)) else {
                continue;
            };
            for captures in consts::FLASHVAR_REGEX.captures_iter(body.as_str()) {
                let value = captures.get(2).or(captures.get(3)).or(captures.get(4));
                if let Some(key) = captures.get(1)
                    && let Some(value) = value
                {
                    // First definition wins, matching how the player reads them.
                    values
                        .entry(key.as_str().to_ascii_lowercase())
                        .or_insert_with(|| value.as_str().trim().to_string());
                }
            }
            break;
        }
        Self { values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// First non-empty value among `keys`.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// `(label, url)` pairs for every advertised rendition, unlabeled ones
    /// with an empty label.
    pub fn renditions(&self) -> Vec<(&str, &str)> {
        RENDITION_KEYS
            .iter()
            .filter_map(|(url_key, label_key)| {
                let url = self.get(url_key)?;
                Some((self.get(label_key).unwrap_or_default(), url))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: &str = r#"
        <html><body>
        <script>var unrelated = { video_url: 'https://nope.example/0.mp4' };</script>
        <script type="text/javascript">
            var flashvars = {
                video_id: '3055012',
                license_code: '$1234',
                video_url: 'function/0/https://cdn.example.com/3055012_480p.mp4/',
                video_url_text: '480p',
                video_alt_url: 'function/0/https://cdn.example.com/3055012_720p.mp4/',
                video_alt_url_text: '720p',
                video_alt_url2: '',
                preview_url: "https://cdn.example.com/preview.jpg",
                duration: 95,
                Video_ID: '1'
            };
        </script>
        </body></html>
    "#;

    #[test]
    fn test_reads_player_configuration() {
        let flashvars = Flashvars::new(&Html::parse_document(PLAYER));
        assert_eq!(flashvars.get("video_id"), Some("3055012"));
        assert_eq!(flashvars.get("duration"), Some("95"));
        assert_eq!(flashvars.get("preview_url"), Some("https://cdn.example.com/preview.jpg"));
        assert_eq!(flashvars.get("video_alt_url2"), None);
        assert_eq!(flashvars.first_of(&["missing", "license_code"]), Some("$1234"));
    }

    #[test]
    fn test_renditions_in_player_order() {
        let flashvars = Flashvars::new(&Html::parse_document(PLAYER));
        assert_eq!(
            flashvars.renditions(),
            vec![
                ("480p", "function/0/https://cdn.example.com/3055012_480p.mp4/"),
                ("720p", "function/0/https://cdn.example.com/3055012_720p.mp4/"),
            ]
        );
    }

    #[test]
    fn test_missing_player() {
        let flashvars = Flashvars::new(&Html::parse_document("<p>nothing here</p>"));
        assert!(flashvars.is_empty());
        assert!(flashvars.renditions().is_empty());
    }
}
