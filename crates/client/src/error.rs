//! Client Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A client error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong, phrased for whoever has to tell the user.
///
/// Cloneable so that one failed in-flight fetch can be handed to every caller
/// that was waiting on it.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network, timeout or proxy failure. Never retried automatically.
    #[display("could not reach the site: {_0}")]
    TransportFailed(#[error(not(source))] String),
    /// A required field was missing; the site's markup probably changed.
    #[display("could not read this page: {_0}")]
    ParseFailed(#[error(not(source))] String),
    /// A bare ID that no earlier listing has mapped to a slug.
    #[display("video {_0} is unknown, search or browse for it first or use its id/slug reference")]
    UnknownId(#[error(not(source))] u64),
    #[display("the site reports no such video")]
    NotFound,
    #[display("quality {_0} is not available for this video")]
    QualityNotAvailable(#[error(not(source))] String),
    #[display("invalid video reference: {_0}")]
    InvalidReference(#[error(not(source))] String),
    #[display("video {_0} has no thumbnail")]
    NoThumbnail(#[error(not(source))] u64),
    /// A shared fetch ended without an outcome (panic or runtime shutdown).
    #[display("fetch aborted: {_0}")]
    Aborted(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportFailed(_) | Self::Aborted(_))
    }
}

impl From<r34v_cache::error::ErrorKind> for ErrorKind {
    fn from(kind: r34v_cache::error::ErrorKind) -> Self {
        match kind {
            r34v_cache::error::ErrorKind::FetchAborted(reason) => Self::Aborted(reason),
        }
    }
}

impl From<&r34v_transport::error::ErrorKind> for ErrorKind {
    fn from(kind: &r34v_transport::error::ErrorKind) -> Self {
        match kind {
            r34v_transport::error::ErrorKind::NotFound(_) => Self::NotFound,
            other => Self::TransportFailed(other.to_string()),
        }
    }
}

impl From<&r34v_extract::error::ErrorKind> for ErrorKind {
    fn from(kind: &r34v_extract::error::ErrorKind) -> Self {
        match kind {
            r34v_extract::error::ErrorKind::NotFound => Self::NotFound,
            other => Self::ParseFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_not_found_is_not_found() {
        let kind = r34v_transport::error::ErrorKind::NotFound("https://rule34video.com/video/1/a/".into());
        assert_eq!(ErrorKind::from(&kind), ErrorKind::NotFound);
    }

    #[test]
    fn test_transport_timeout_is_transport_failure() {
        let kind = r34v_transport::error::ErrorKind::Timeout("https://rule34video.com/".into());
        let converted = ErrorKind::from(&kind);
        assert!(matches!(converted, ErrorKind::TransportFailed(_)));
        assert!(converted.is_retryable());
    }

    #[test]
    fn test_missing_field_is_parse_failure() {
        let kind = r34v_extract::error::ErrorKind::MissingField("title");
        assert_eq!(ErrorKind::from(&kind), ErrorKind::ParseFailed("missing required field: title".into()));
    }

    #[test]
    fn test_aborted_fetch() {
        let kind = r34v_cache::error::ErrorKind::FetchAborted("task panicked".into());
        assert_eq!(ErrorKind::from(kind), ErrorKind::Aborted("task panicked".into()));
    }
}
