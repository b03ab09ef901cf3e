use std::time::Duration;

use exn::ResultExt;
use r34v_config::Config;
use r34v_extract::models::QualityRequest;
use r34v_thumbnail::Level;

use crate::error::{ErrorKind, Result};

/// Per-client knobs, usually derived from a [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Lifetime of cached records and id→slug mappings.
    pub cache_ttl: Duration,
    /// Used when a direct-link request names no quality.
    pub default_quality: QualityRequest,
    /// Upper bound on the addresses in any listing.
    pub max_search_results: usize,
    pub mosaic_level: Level,
    pub blur_level: Level,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(24 * 3600),
            default_quality: QualityRequest::Best,
            max_search_results: 10,
            mosaic_level: Level::clamped(70),
            blur_level: Level::OFF,
        }
    }
}
impl Settings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let default_quality = config
            .quality()
            .or_raise(|| ErrorKind::QualityNotAvailable(config.default_quality.clone()))?;
        Ok(Self {
            cache_ttl: config.cache_ttl(),
            default_quality,
            max_search_results: config.max_search_results.max(1),
            mosaic_level: Level::clamped(config.mosaic_level),
            blur_level: Level::clamped(config.blur_level),
        })
    }

    /// The effective listing size for a caller-supplied limit.
    pub(crate) fn listing_limit(&self, requested: Option<usize>) -> usize {
        requested.map_or(self.max_search_results, |limit| limit.min(self.max_search_results))
    }

    pub(crate) fn ttl(&self) -> time::Duration {
        time::Duration::try_from(self.cache_ttl).unwrap_or(time::Duration::MAX)
    }
}
