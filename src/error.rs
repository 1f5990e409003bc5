// src/error.rs
// =============================================================================
// Error types shared across the crawler.
//
// There are three families, and each one is handled differently:
// - ConfigError: something is wrong with the command line. Fatal, reported
//   before any request is made.
// - FetchError: one page could not be fetched. Recorded inside that page's
//   CrawlResult; the crawl keeps going.
// - SinkError: results cannot be written anywhere. Fatal, the crawl stops.
//
// Rust concepts:
// - thiserror: derive macro that writes the Display/Error impls for us
// - #[from]: lets `?` convert a lower-level error automatically
// =============================================================================

use thiserror::Error;

/// Problems with the user's configuration, found before crawling starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("unsupported URL scheme '{0}' (only http and https can be crawled)")]
    UnsupportedScheme(String),

    #[error("invalid exclusion pattern: {0}")]
    InvalidExclude(#[from] regex::Error),

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("invalid duration '{0}' (expected e.g. 30s, 500ms, 2m)")]
    InvalidDuration(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Transport-level failure of a single fetch.
///
/// HTTP error statuses (404, 500, ...) are NOT fetch errors: the page was
/// fetched, it just said no. Only failures to get a response at all end up
/// here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("could not resolve hostname: {0}")]
    Dns(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("crawl cancelled before the fetch completed")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// The output sink failed; results can no longer be delivered.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot create output file '{path}': {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write result: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode JSON record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode CSV record: {0}")]
    Csv(#[from] csv::Error),

    #[error("output task stopped unexpectedly: {0}")]
    Join(String),
}
