// src/fetch/mod.rs
// =============================================================================
// This module fetches pages.
//
// The crawl engine never talks to reqwest directly. It talks to the
// `Fetcher` trait, which has exactly one job: given a URL, return the status,
// content type and body, or a transport error. The real implementation
// (HttpFetcher, in http.rs) uses reqwest; tests plug in an in-memory link
// graph instead.
//
// Submodules:
// - http: the reqwest-backed Fetcher, plus header/cookie parsing
// =============================================================================

mod http;

pub use http::HttpFetcher;

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::FetchError;

/// Per-request settings applied to every fetch of a crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Covers the whole request/response cycle, body included.
    pub timeout: Duration,
    pub user_agent: Option<String>,
    /// Raw `-H` value: `Name: Value` pairs separated by `;`.
    pub headers: Option<String>,
    /// Raw `-C` value: `name=value` pairs separated by `;`.
    pub cookies: Option<String>,
}

impl RequestOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            user_agent: None,
            headers: None,
            cookies: None,
        }
    }
}

/// A response that made it back to us, whatever its HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Where the response actually came from, after redirects. Relative
    /// links on the page resolve against this.
    pub url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// Send + Sync because a single fetcher is shared by every worker task.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issues one request for `url`.
    ///
    /// Every HTTP status counts as a completed fetch; only transport-level
    /// failures (DNS, connect, timeout, TLS, body read) are errors.
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}
