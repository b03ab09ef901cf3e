//! In-memory transport for testing.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::Transport;
use crate::error::{ErrorKind, Result};

#[derive(Debug, Clone)]
enum Response {
    Body(Vec<u8>),
    Failure(ErrorKind),
}

/// In-memory transport for testing.
///
/// Responses are keyed by exact URL; unknown URLs answer
/// [`NotFound`](ErrorKind::NotFound). Every request is recorded, so tests can
/// assert how many upstream fetches an operation caused.
#[derive(Debug)]
pub struct MockTransport {
    name: String,
    responses: RwLock<HashMap<String, Response>>,
    requests: RwLock<Vec<String>>,
    delay: Option<Duration>,
}

impl MockTransport {
    /// Create a mock transport that serves the given bodies.
    pub fn with_pages(pages: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        let responses = pages
            .into_iter()
            .map(|(url, body)| (url.into(), Response::Body(body.into())))
            .collect();
        Self {
            name: "mock".to_string(),
            responses: RwLock::new(responses),
            requests: RwLock::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Wait this long before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer `url` with an error instead of a body.
    pub fn with_failure(mut self, url: impl Into<String>, kind: ErrorKind) -> Self {
        self.responses.get_mut().insert(url.into(), Response::Failure(kind));
        self
    }

    pub async fn insert(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.responses.write().await.insert(url.into(), Response::Body(body.into()));
    }

    /// Total number of requests made, answered or not.
    pub async fn calls(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Number of requests made for exactly `url`.
    pub async fn calls_for(&self, url: &str) -> usize {
        self.requests.read().await.iter().filter(|u| *u == url).count()
    }

    /// Every requested URL, in request order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        let pages: [(&str, &str); 0] = [];
        Self::with_pages(pages)
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.write().await.push(url.to_string());
        debug!(url, "mock fetch");
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.responses.read().await.get(url).cloned() {
            Some(Response::Body(body)) => Ok(body),
            Some(Response::Failure(kind)) => Err(exn::Exn::from(kind)),
            None => Err(exn::Exn::from(ErrorKind::NotFound(url.to_string()))),
        }
    }
}
