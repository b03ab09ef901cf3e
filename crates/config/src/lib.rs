//! Layered configuration: built-in defaults, then a file in the platform
//! config directory, then an explicitly named file, then `R34V_*`
//! environment variables.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use r34v_extract::models::QualityRequest;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, instrument};

pub const ENV_PREFIX: &str = "R34V_";
const FILE_STEM: &str = "r34v";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Proxy URL handed to the transport, e.g. `socks5://127.0.0.1:1080`.
    pub proxy: Option<String>,
    /// Transport timeout in seconds.
    pub request_timeout: u64,
    pub cache_ttl_hours: u64,
    pub default_quality: String,
    pub max_search_results: usize,
    /// Clamped into `0..=100` when used, never rejected.
    pub mosaic_level: i64,
    pub blur_level: i64,
    pub show_thumbnail: bool,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            proxy: None,
            request_timeout: 30,
            cache_ttl_hours: 24,
            default_quality: QualityRequest::Best.to_string(),
            max_search_results: 10,
            mosaic_level: 70,
            blur_level: 0,
            show_thumbnail: true,
        }
    }
}

impl Config {
    /// Load from every layer using the platform configuration directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let dirs = ProjectDirs::from("com", "rule34video", FILE_STEM);
        Self::from_figment(Self::figment(dirs.as_ref().map(ProjectDirs::config_dir), explicit)?)
    }

    /// Build the provider stack without extracting it.
    pub fn figment(config_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(dir) = config_dir {
            debug!(dir = %dir.display(), "searching configuration directory");
            figment = figment
                .merge(Toml::file(dir.join(format!("{FILE_STEM}.toml"))))
                .merge(Yaml::file(dir.join(format!("{FILE_STEM}.yaml"))))
                .merge(Json::file(dir.join(format!("{FILE_STEM}.json"))));
        }
        if let Some(path) = explicit {
            figment = merge_file(figment, path)?;
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    #[instrument(skip_all)]
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout == 0 {
            exn::bail!(ErrorKind::Invalid { key: "request_timeout", reason: "must be at least one second".into() });
        }
        if self.max_search_results == 0 {
            exn::bail!(ErrorKind::Invalid { key: "max_search_results", reason: "must be at least one".into() });
        }
        self.quality()?;
        Ok(())
    }

    pub fn quality(&self) -> Result<QualityRequest> {
        self.default_quality.parse::<QualityRequest>().or_raise(|| ErrorKind::Invalid {
            key: "default_quality",
            reason: format!("'{}' is not a quality", self.default_quality),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_hours.saturating_mul(3600))
    }

    /// The proxy, if one is set and not blank.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref().map(str::trim).filter(|proxy| !proxy.is_empty())
    }
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    if !path.is_file() {
        exn::bail!(ErrorKind::FileNotFound(path.display().to_string()));
    }
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
    let path: PathBuf = path.to_path_buf();
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.display().to_string())),
    })
}
