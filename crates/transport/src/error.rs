//! Transport Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A transport error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server answered 404 for this URL.
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// Any other non-success HTTP status.
    #[display("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    /// No complete response within the configured timeout.
    #[display("timed out fetching {_0}")]
    Timeout(#[error(not(source))] String),
    /// Connection, TLS, proxy or body errors.
    #[display("network error fetching {_0}")]
    Network(#[error(not(source))] String),
    /// The transport could not be built from its options (bad proxy URL, ...).
    #[display("invalid transport configuration: {_0}")]
    InvalidConfig(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::NotFound(_) | Self::InvalidConfig(_) => false,
        }
    }
}
