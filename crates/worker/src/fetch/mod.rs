//! Network fetch capability behind a swappable trait.
//!
//! The cache manager never talks to the network directly; it goes through
//! the [`Fetch`] trait so tests can substitute a scripted double. The
//! production implementation is [`HttpFetcher`], a thin reqwest wrapper.
//!
//! An HTTP response with an error status is a *resolved* fetch and comes
//! back as `Ok`; only transport failures (timeout, refused connection,
//! interrupted body) are reported as [`FetchError`].

pub mod resolve;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use url::Url;

use offcache_core::{FetchError, ResponseSnapshot};

pub use resolve::{ResolveError, resolve};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "offcache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "offcache/0.1".to_string(), max_bytes: 5 * 1024 * 1024, timeout: Duration::from_millis(20000) }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// HTTP status code
    pub status: u16,
    /// Response headers as (name, value) pairs
    pub headers: Vec<(String, String)>,
    /// Response body bytes
    pub body: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Convert into a storable snapshot, stamping the fetch time.
    pub fn into_snapshot(self) -> ResponseSnapshot {
        ResponseSnapshot {
            url: self.url.to_string(),
            status: self.status,
            headers: self.headers,
            body: self.body.to_vec(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// The injected network fetch capability.
///
/// One fetch attempt per call; no retry or backoff. Implementations must
/// be shareable across the spawned revalidation tasks.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch a URL, returning the resolved response or a transport failure.
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError>;
}

/// HTTP fetch client backed by reqwest.
pub struct HttpFetcher {
    http: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(err.to_string())
    } else if err.is_connect() {
        FetchError::Connect(err.to_string())
    } else {
        FetchError::Transport(err.to_string())
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let start = Instant::now();

        let response = self.http.get(url.as_str()).send().await.map_err(classify)?;

        let status = response.status().as_u16();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(FetchError::TooLarge { limit: self.config.max_bytes });
        }

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| (name.to_string(), String::from_utf8_lossy(value.as_bytes()).to_string()))
            .collect();

        let body = response.bytes().await.map_err(classify)?;

        if body.len() > self.config.max_bytes {
            return Err(FetchError::TooLarge { limit: self.config.max_bytes });
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("fetched {} -> {} in {}ms ({} bytes)", url, status, fetch_ms, body.len());

        Ok(FetchResponse { url: url.clone(), status, headers, body, fetch_ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "offcache/0.1");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20000));
    }

    #[test]
    fn test_into_snapshot() {
        let response = FetchResponse {
            url: Url::parse("https://example.com/styles.css").unwrap(),
            status: 200,
            headers: vec![("content-type".to_string(), "text/css".to_string())],
            body: Bytes::from_static(b"body{}"),
            fetch_ms: 12,
        };

        let snapshot = response.into_snapshot();
        assert_eq!(snapshot.url, "https://example.com/styles.css");
        assert_eq!(snapshot.status, 200);
        assert_eq!(snapshot.body, b"body{}");
        assert_eq!(snapshot.header("content-type"), Some("text/css"));
        assert!(!snapshot.fetched_at.is_empty());
    }

    #[tokio::test]
    async fn test_http_fetcher_new() {
        let fetcher = HttpFetcher::new(FetchConfig::default());
        assert!(fetcher.is_ok());
    }
}
