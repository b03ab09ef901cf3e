//! The one capability the rest of the workspace needs from the network:
//! `fetch(url) -> bytes`.
//!
//! Proxy and timeout are properties of a transport instance rather than of
//! each call, so callers only ever deal with URLs.

pub mod error;
mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
pub use crate::http::{DEFAULT_USER_AGENT, HttpOptions, HttpTransport};
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::MockTransport;

pub type TransportHandle = Arc<dyn Transport + Send + Sync>;

/// Fetches raw response bodies.
///
/// # Examples
///
/// ```
/// use r34v_transport::{Transport, error::Result};
///
/// async fn page_size(transport: &dyn Transport, url: &str) -> Result<usize> {
///     Ok(transport.fetch(url).await?.len())
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Name of the transport, for logging only.
    fn name(&self) -> &str;

    /// GET `url` and return the complete response body.
    ///
    /// A 404 is reported as [`NotFound`](crate::error::ErrorKind::NotFound);
    /// other failures as the remaining [`ErrorKind`](crate::error::ErrorKind)
    /// variants. Implementations never retry.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
