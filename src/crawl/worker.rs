// src/crawl/worker.rs
// =============================================================================
// One worker of the pool.
//
// Each worker loops:
// 1. take a target from the frontier (waits if the queue is empty)
// 2. fetch it (or give up early if the crawl is cancelled)
// 3. extract + normalize links and admit them at depth + 1
// 4. send exactly one CrawlResult to the output channel
// 5. tell the frontier the target is complete
//
// A fetch error only affects its own page: the result carries the error,
// no links are followed from it, and the worker moves on.
// =============================================================================

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::engine::CrawlStats;
use super::queue::{Admission, Frontier};
use super::{CrawlResult, CrawlTarget};
use crate::error::FetchError;
use crate::extract::{extract_links, Normalizer};
use crate::fetch::{FetchedPage, Fetcher};

pub(super) struct Worker {
    pub id: usize,
    pub frontier: Arc<Frontier>,
    pub fetcher: Arc<dyn Fetcher>,
    pub normalizer: Arc<Normalizer>,
    pub results: mpsc::Sender<CrawlResult>,
    pub cancel: CancellationToken,
    pub stats: Arc<CrawlStats>,
    pub follow_error_pages: bool,
}

// Completes the target when dropped, so even a panicking worker cannot
// leave the outstanding count stuck above zero.
struct InFlight<'a>(&'a Frontier);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.complete();
    }
}

impl Worker {
    pub async fn run(self) {
        debug!(worker = self.id, "worker started");

        while let Some(target) = self.frontier.next().await {
            let _in_flight = InFlight(self.frontier.as_ref());

            let result = self.visit(target).await;

            // Blocks while the sink is behind: backpressure, not buffering.
            if self.results.send(result).await.is_err() {
                warn!(worker = self.id, "result stream closed, cancelling crawl");
                self.cancel.cancel();
                break;
            }
        }

        debug!(worker = self.id, "worker exiting");
    }

    async fn visit(&self, target: CrawlTarget) -> CrawlResult {
        // `biased` checks cancellation first, so once the crawl is cancelled
        // no new request goes out even if the fetch would be instant
        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled),
            fetched = self.fetcher.fetch(&target.url) => fetched,
        };

        match outcome {
            Ok(page) => {
                self.stats.fetched.fetch_add(1, Ordering::Relaxed);
                debug!(
                    worker = self.id,
                    url = %target.url,
                    depth = target.depth,
                    status = page.status,
                    "page fetched"
                );

                if self.should_follow(&target, &page) {
                    self.discover(&target, &page);
                }
                CrawlResult::fetched(target, page)
            }
            Err(error) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                warn!(url = %target.url, depth = target.depth, %error, "fetch failed");
                CrawlResult::failed(target, error)
            }
        }
    }

    fn should_follow(&self, target: &CrawlTarget, page: &FetchedPage) -> bool {
        if !page.is_success() && !self.follow_error_pages {
            return false;
        }
        // Children would be too deep anyway; skip the parsing.
        let max_depth = self.frontier.limits().max_depth;
        max_depth == 0 || target.depth < max_depth
    }

    fn discover(&self, target: &CrawlTarget, page: &FetchedPage) {
        // Everything found on this page sits one level below it
        let depth = target.depth + 1;

        // Links come back in document order, so admission order (and the
        // rough BFS order of the crawl) follows the page
        for raw in extract_links(&page.body, page.content_type.as_deref()) {
            self.stats.links_found.fetch_add(1, Ordering::Relaxed);

            // Resolve against page.url, the post-redirect address, so
            // relative links point where the browser would send them
            let url = match self.normalizer.normalize(&raw, &page.url) {
                Ok(url) => url,
                Err(rejection) => {
                    trace!(link = %raw, reason = rejection.as_str(), "link rejected");
                    self.stats.record_rejection(rejection);
                    continue;
                }
            };

            // The frontier does the dedup and limit checks under its lock;
            // we only keep score
            match self.frontier.try_admit(CrawlTarget { url, depth }) {
                Admission::Admitted | Admission::TooDeep => {}
                Admission::AlreadyVisited => {
                    self.stats.duplicates.fetch_add(1, Ordering::Relaxed);
                }
                // Nothing else on this page can get in.
                Admission::PageLimitReached | Admission::Closed => break,
            }
        }
    }
}
