//! Page fetching
//!
//! This module defines the fetcher contract the crawl depends on and its
//! HTTP implementation:
//! - Building HTTP clients with a proper user agent string
//! - GET requests with a per-request timeout
//! - Content-Type checks (only HTML is segmented)
//! - Link extraction from the fetched document
//! - Error classification into `FetchError`

use crate::config::UserAgentConfig;
use crate::crawler::parser::extract_links;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// A successfully fetched page, before cleaning
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,

    /// URL after redirects
    pub final_url: Url,

    /// Raw response body
    pub content: Vec<u8>,

    /// Absolute outgoing links in document order
    pub links: Vec<String>,
}

/// Retrieves a page and its outgoing links
///
/// The crawl only relies on this contract, so tests and embedders can plug
/// in their own transport.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, giving up after `timeout`
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```
/// use doc_taxonomy::config::UserAgentConfig;
/// use doc_taxonomy::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher identifying itself with the configured user agent
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL with error classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx + HTML | `FetchedPage` |
    /// | 2xx, other Content-Type | `FetchError::ContentMismatch` |
    /// | 4xx / 5xx | `FetchError::Status` |
    /// | Timeout | `FetchError::Timeout` |
    /// | Connection / TLS / redirect failure | `FetchError::Network` |
    /// | Body read failure | `FetchError::Body` |
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        // A missing Content-Type is given the benefit of the doubt
        if !content_type.is_empty()
            && !content_type.contains("text/html")
            && !content_type.contains("application/xhtml")
        {
            return Err(FetchError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let content = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let links = extract_links(&String::from_utf8_lossy(&content), &final_url);

        Ok(FetchedPage {
            status: status.as_u16(),
            final_url,
            content: content.to_vec(),
            links,
        })
    }
}

/// Maps a transport-level reqwest error onto the fetch taxonomy
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
