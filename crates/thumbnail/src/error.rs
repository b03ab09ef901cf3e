//! Thumbnail Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A thumbnail error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for thumbnail operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Image processing itself never fails a request (it degrades to returning
/// the source image); these errors come from handling the scratch file or
/// are recorded while degrading.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bytes are not an image in a supported format.
    #[display("unsupported or corrupt image")]
    Decode,
    /// The processed image could not be written back in its source format.
    #[display("could not encode image as {_0}")]
    Encode(#[error(not(source))] &'static str),
    #[display("scratch file I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }
}
