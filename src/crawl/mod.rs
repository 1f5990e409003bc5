// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine.
//
// Pieces, leaf-first:
// - visited: the set of canonical URLs already admitted (dedup key)
// - queue: the frontier - pending targets, limits, in-flight tracking and
//   the Idle -> Running -> Draining -> Done lifecycle
// - worker: one worker's loop (dequeue, fetch, extract, admit, emit)
// - engine: the Crawler that wires a fixed pool of workers to a frontier,
//   a fetcher and a result channel
//
// The data types every piece shares live in this file.
// =============================================================================

mod engine;
mod queue;
mod visited;
mod worker;

pub use engine::{CrawlSummary, Crawler};

use url::Url;

use crate::error::FetchError;
use crate::fetch::FetchedPage;

/// Global limits enforced at admission. Zero disables a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Deepest depth a target may have (the seed is depth 0).
    pub max_depth: usize,
    /// Most targets that may ever be admitted, seed included.
    pub max_pages: usize,
}

/// A canonical URL waiting to be fetched, and how many hops it is from the
/// seed. Consumed exactly once by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: Url,
    pub depth: usize,
}

/// What one fetch attempt produced. Exactly one per admitted target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    /// The admitted (canonical) URL, not the post-redirect one.
    pub url: Url,
    pub depth: usize,
    /// None when no response was received.
    pub status: Option<u16>,
    pub content_type: Option<String>,
    pub body: String,
    pub error: Option<FetchError>,
}

impl CrawlResult {
    pub fn fetched(target: CrawlTarget, page: FetchedPage) -> Self {
        Self {
            url: target.url,
            depth: target.depth,
            status: Some(page.status),
            content_type: page.content_type,
            body: page.body,
            error: None,
        }
    }

    pub fn failed(target: CrawlTarget, error: FetchError) -> Self {
        Self {
            url: target.url,
            depth: target.depth,
            status: None,
            content_type: None,
            body: String::new(),
            error: Some(error),
        }
    }
}
