use std::time::Duration;

use async_trait::async_trait;
use exn::ResultExt;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Client, Proxy, StatusCode, redirect};
use tracing::{debug, instrument};

use crate::Transport;
use crate::error::{ErrorKind, Result};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REDIRECTS: usize = 10;

/// How an [`HttpTransport`] reaches the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    /// `http://`, `https://` or `socks5://` proxy for every request.
    pub proxy: Option<String>,
    /// Budget for a whole request, connection through body.
    pub timeout: Duration,
    pub user_agent: String,
}
impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// [`Transport`] over HTTPS, with browser-like headers.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}
impl HttpTransport {
    pub fn new(options: &HttpOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        let mut builder = Client::builder()
            .user_agent(options.user_agent.as_str())
            .default_headers(headers)
            .timeout(options.timeout)
            .connect_timeout(options.timeout.min(Duration::from_secs(10)))
            .redirect(redirect::Policy::limited(MAX_REDIRECTS));
        if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
            let proxy = Proxy::all(proxy.trim()).or_raise(|| ErrorKind::InvalidConfig(format!("proxy '{proxy}'")))?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().or_raise(|| ErrorKind::InvalidConfig("HTTP client".to_string()))?;
        Ok(Self { client })
    }

    fn classify(url: &str, err: &reqwest::Error) -> ErrorKind {
        if err.is_timeout() {
            ErrorKind::Timeout(url.to_string())
        } else {
            ErrorKind::Network(url.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await.map_err(|err| {
            let kind = Self::classify(url, &err);
            exn::Exn::from(err).raise(kind)
        })?;
        let status = response.status();
        debug!(%status, final_url = %response.url(), "response received");
        if status == StatusCode::NOT_FOUND {
            exn::bail!(ErrorKind::NotFound(url.to_string()));
        }
        if !status.is_success() {
            exn::bail!(ErrorKind::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(|err| {
            let kind = Self::classify(url, &err);
            exn::Exn::from(err).raise(kind)
        })?;
        debug!(bytes = body.len(), "body received");
        Ok(body.to_vec())
    }
}
