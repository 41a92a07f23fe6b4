//! HTTP fetch gateway
//!
//! This module handles all HTTP requests for the crawler, including:
//! - The [`FetchGateway`] seam the coordinator fetches through
//! - Building HTTP clients with the LinkSpector user agent
//! - Error classification into [`FetchError`]
//! - Refusing new requests once the gateway was stopped
//!
//! No retries are performed: one failure is final for an address.

use crate::config::CrawlOptions;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::Client;
use std::error::Error as StdError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Client identifier attached to every request
pub const USER_AGENT: &str = concat!("LinkSpector v", env!("CARGO_PKG_VERSION"));

/// A response received from a server, whatever its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    /// Address that produced the response, after any redirects
    pub final_url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Reason phrase for the status, empty for non-standard codes
    pub reason: String,
    /// Content-Type header value, empty if absent
    pub content_type: String,
    /// Page body; only read for HTML responses
    pub body: String,
}

/// Transport-level failure of a single fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("TLS error for {url}: {message}")]
    Tls { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Gateway stopped, request to {url} was not sent")]
    Cancelled { url: String },

    #[error("Request to {url} failed: {message}")]
    Other { url: String, message: String },
}

/// Outcome of fetching one address
pub type FetchOutcome = Result<ResponseRecord, FetchError>;

/// Performs network fetches on behalf of the coordinator
///
/// Implementations must be safe to call from many tasks at once. After
/// [`FetchGateway::stop`] no new request may be issued; requests already in
/// flight are left to complete or time out.
#[async_trait]
pub trait FetchGateway: Send + Sync {
    /// Fetches one address
    async fn fetch(&self, url: &Url) -> FetchOutcome;

    /// Stops issuing new requests
    fn stop(&self);

    /// Returns true once [`FetchGateway::stop`] was called
    fn is_stopped(&self) -> bool;
}

/// Builds an HTTP client from the crawl options
///
/// The client sends `User-Agent: LinkSpector v<version>` and
/// `Cache-Control: no-cache`, applies the configured timeout to the whole
/// request and, if asked to, accepts invalid TLS certificates.
pub fn build_http_client(options: &CrawlOptions) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(Duration::from_secs(options.timeout_seconds))
        .danger_accept_invalid_certs(options.allow_insecure_tls)
        .gzip(true)
        .brotli(true)
        .build()
}

/// The reqwest-backed gateway
pub struct HttpGateway {
    client: Client,
    stopped: AtomicBool,
}

impl HttpGateway {
    /// Creates a gateway with a client built from `options`
    pub fn new(options: &CrawlOptions) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(options)?))
    }

    /// Creates a gateway around an existing client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            stopped: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl FetchGateway for HttpGateway {
    async fn fetch(&self, url: &Url) -> FetchOutcome {
        if self.is_stopped() {
            return Err(FetchError::Cancelled {
                url: url.to_string(),
            });
        }

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, &e))?;

        let final_url = response.url().clone();
        if final_url != *url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        // Only HTML pages are ever scanned for links
        let body = if is_html(&content_type) {
            response.text().await.map_err(|e| FetchError::Body {
                url: url.to_string(),
                message: error_chain(&e),
            })?
        } else {
            String::new()
        };

        Ok(ResponseRecord {
            final_url,
            status_code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            content_type,
            body,
        })
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// Returns true if the media type of a Content-Type value is `text/html`
///
/// Parameters such as `charset` are ignored.
pub fn is_html(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|media_type| media_type.trim().eq_ignore_ascii_case("text/html"))
        .unwrap_or(false)
}

/// Classifies a reqwest error into a [`FetchError`]
fn classify_error(url: &Url, error: &reqwest::Error) -> FetchError {
    let url = url.to_string();
    let message = error_chain(error);
    let lowered = message.to_lowercase();

    if error.is_timeout() {
        FetchError::Timeout { url }
    } else if lowered.contains("certificate") || lowered.contains("tls") || lowered.contains("ssl")
    {
        FetchError::Tls { url, message }
    } else if error.is_connect() {
        FetchError::Connect { url, message }
    } else {
        FetchError::Other { url, message }
    }
}

/// Joins an error and all of its sources into one message
///
/// reqwest's own message rarely names the root cause (DNS, refused
/// connection, bad certificate); the sources do.
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
