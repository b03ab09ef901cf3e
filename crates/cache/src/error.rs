//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// The store itself never fails a lookup; the only failure it can introduce
/// is a shared fetch that ended without producing an outcome.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The task running an in-flight fetch panicked or was cancelled by the
    /// runtime before it produced a value.
    #[display("in-flight fetch for '{_0}' ended without an outcome")]
    FetchAborted(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Nothing was recorded for the key, so the next lookup starts a fresh fetch.
        matches!(self, Self::FetchAborted(_))
    }
}
