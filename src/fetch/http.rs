// src/fetch/http.rs
// =============================================================================
// The reqwest-backed Fetcher.
//
// Key functionality:
// - Builds ONE reqwest client per crawl (connection pooling is shared by all
//   workers) with the timeout, User-Agent, custom headers and cookies baked
//   in as defaults
// - Issues a GET per URL and reads the full body
// - Sorts reqwest's errors into our FetchError categories (timeout, DNS,
//   TLS, ...) so each CrawlResult says what went wrong
//
// Header and cookie lists come straight from the command line, so they are
// parsed leniently: a malformed entry is logged and skipped, never fatal.
// =============================================================================

use std::error::Error as StdError;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::{redirect, Client};
use tracing::{debug, warn};
use url::Url;

use super::{FetchedPage, Fetcher, RequestOptions};
use crate::error::{ConfigError, FetchError};

const MAX_REDIRECTS: usize = 10;

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds the shared HTTP client from the request options.
    pub fn new(options: &RequestOptions) -> Result<Self, ConfigError> {
        let mut headers = options
            .headers
            .as_deref()
            .map(parse_headers)
            .unwrap_or_default();

        if let Some(cookie) = options.cookies.as_deref().and_then(parse_cookies) {
            headers.insert(COOKIE, cookie);
        }

        let mut builder = Client::builder()
            .timeout(options.timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .default_headers(headers);

        if let Some(user_agent) = &options.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        // Headers, cookies, UA and timeout are already defaults on the
        // client, so a plain GET is all we need here
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(categorize_error)?;

        // Grab everything we need from the response head before
        // `bytes()` consumes the response
        let final_url = response.url().clone();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // The client timeout keeps ticking while the body streams in, so a
        // slow body surfaces here as a timeout too.
        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(error_chain(&e))
            }
        })?;

        debug!(%url, status, bytes = bytes.len(), "fetched");

        Ok(FetchedPage {
            url: final_url,
            status,
            content_type,
            // Pages in odd encodings still get their ASCII links extracted
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Parses `Name: Value; Name2: Value2` into a header map.
///
/// Splits on the first `:` only, so values such as URLs keep their colons.
pub fn parse_headers(raw: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for entry in raw.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let Some((name, value)) = entry.split_once(':') else {
            warn!(header = entry, "skipping malformed header (expected 'Name: Value')");
            continue;
        };

        let name = match HeaderName::from_bytes(name.trim().as_bytes()) {
            Ok(name) => name,
            Err(_) => {
                warn!(header = entry, "skipping header with invalid name");
                continue;
            }
        };
        let value = match HeaderValue::from_str(value.trim()) {
            Ok(value) => value,
            Err(_) => {
                warn!(header = entry, "skipping header with invalid value");
                continue;
            }
        };

        headers.insert(name, value);
    }

    headers
}

/// Parses `name=value; name2=value2` into a single `Cookie` header value.
///
/// Returns None when no entry survives.
pub fn parse_cookies(raw: &str) -> Option<HeaderValue> {
    let mut pairs = Vec::new();

    for entry in raw.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        match entry.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                pairs.push(format!("{}={}", name.trim(), value.trim()));
            }
            _ => warn!(cookie = entry, "skipping malformed cookie (expected 'name=value')"),
        }
    }

    if pairs.is_empty() {
        return None;
    }

    match HeaderValue::from_str(&pairs.join("; ")) {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("cookie list contains characters not allowed in a header; ignoring cookies");
            None
        }
    }
}

// Sorts a reqwest error into one of our transport categories.
//
// reqwest's own Display only shows the outermost layer ("error sending
// request"), so we look at the whole source chain to spot DNS and TLS
// failures.
fn categorize_error(error: reqwest::Error) -> FetchError {
    let chain = error_chain(&error);
    let lowered = chain.to_lowercase();

    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_redirect() {
        FetchError::TooManyRedirects
    } else if error.is_builder() {
        FetchError::InvalidRequest(chain)
    } else if error.is_connect() {
        // reqwest only says "connect"; the TLS vs DNS split has to come
        // from the underlying error messages
        if lowered.contains("certificate") || lowered.contains("tls") || lowered.contains("ssl") {
            FetchError::Tls(chain)
        } else if lowered.contains("dns") || lowered.contains("resolve") || lowered.contains("lookup") {
            FetchError::Dns(chain)
        } else {
            FetchError::Connect(chain)
        }
    } else if error.is_body() || error.is_decode() {
        FetchError::Body(chain)
    } else {
        FetchError::Other(chain)
    }
}

fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
