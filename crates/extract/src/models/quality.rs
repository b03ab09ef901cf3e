use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// Nominal vertical resolution of an encoded rendition.
///
/// Variants are declared from lowest to highest so that the derived [`Ord`]
/// compares by resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quality {
    #[cfg_attr(feature = "serde", serde(rename = "240p"))]
    P240,
    #[cfg_attr(feature = "serde", serde(rename = "360p"))]
    P360,
    #[cfg_attr(feature = "serde", serde(rename = "480p"))]
    P480,
    #[cfg_attr(feature = "serde", serde(rename = "720p"))]
    P720,
    #[cfg_attr(feature = "serde", serde(rename = "1080p"))]
    P1080,
    #[cfg_attr(feature = "serde", serde(rename = "1440p"))]
    P1440,
    #[cfg_attr(feature = "serde", serde(rename = "2160p"))]
    P2160,
}
impl Quality {
    /// Every quality, highest first.
    pub const DESCENDING: [Quality; 7] = [
        Quality::P2160,
        Quality::P1440,
        Quality::P1080,
        Quality::P720,
        Quality::P480,
        Quality::P360,
        Quality::P240,
    ];

    pub fn height(&self) -> u32 {
        match self {
            Quality::P240 => 240,
            Quality::P360 => 360,
            Quality::P480 => 480,
            Quality::P720 => 720,
            Quality::P1080 => 1080,
            Quality::P1440 => 1440,
            Quality::P2160 => 2160,
        }
    }

    pub fn from_height(height: u32) -> Option<Self> {
        Self::DESCENDING.into_iter().find(|q| q.height() == height)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::P240 => "240p",
            Quality::P360 => "360p",
            Quality::P480 => "480p",
            Quality::P720 => "720p",
            Quality::P1080 => "1080p",
            Quality::P1440 => "1440p",
            Quality::P2160 => "2160p",
        }
    }
}
impl FromStr for Quality {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sanitized = sanitize(s);
        let quality = match sanitized.as_str() {
            "4k" | "uhd" => Some(Self::P2160),
            "2k" | "qhd" => Some(Self::P1440),
            "fullhd" | "fhd" => Some(Self::P1080),
            "hd" => Some(Self::P720),
            other => other.strip_suffix('p').unwrap_or(other).parse::<u32>().ok().and_then(Self::from_height),
        };
        match quality {
            Some(quality) => Ok(quality),
            None => exn::bail!(ErrorKind::ParseError {
                field: "quality",
                value: s.to_string(),
            }),
        }
    }
}
impl Display for Quality {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// One encoded variant of a video and its direct link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rendition {
    pub quality: Quality,
    pub url: String,
}
impl Rendition {
    pub fn new(quality: Quality, url: impl Into<String>) -> Self {
        Self { quality, url: url.into() }
    }
}

/// A quality token supplied by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualityRequest {
    /// First (highest) rendition available.
    #[default]
    Best,
    /// Last (lowest) rendition available.
    Worst,
    /// Exactly this label, no substitution.
    Exact(Quality),
}
impl FromStr for QualityRequest {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "best" | "highest" | "max" => Self::Best,
            "worst" | "lowest" | "min" => Self::Worst,
            _ => Self::Exact(s.parse()?),
        })
    }
}
impl From<Quality> for QualityRequest {
    fn from(quality: Quality) -> Self {
        Self::Exact(quality)
    }
}
impl Display for QualityRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Best => write!(f, "best"),
            Self::Worst => write!(f, "worst"),
            Self::Exact(quality) => write!(f, "{quality}"),
        }
    }
}
