// src/crawl/engine.rs
// =============================================================================
// The Crawler: wires a fixed pool of workers to a frontier, a fetcher and
// a bounded result channel, and runs the crawl to completion.
//
// Lifecycle (tracked by the frontier):
//   Idle --seed admitted--> Running --nothing outstanding / cancelled-->
//   Draining --all workers exited--> Done
//
// The result channel closes when the last worker drops its sender, which
// is how the output sink knows the stream is complete.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use url::Url;

use super::queue::{CrawlPhase, Frontier};
use super::worker::Worker;
use super::{CrawlLimits, CrawlResult};
use crate::config::CrawlConfig;
use crate::extract::{Normalizer, Rejection};
use crate::fetch::Fetcher;

/// Counters shared by all workers.
#[derive(Debug, Default)]
pub(super) struct CrawlStats {
    pub fetched: AtomicUsize,
    pub failed: AtomicUsize,
    pub links_found: AtomicUsize,
    pub duplicates: AtomicUsize,
    pub malformed: AtomicUsize,
    pub unsupported_scheme: AtomicUsize,
    pub excluded: AtomicUsize,
}

impl CrawlStats {
    pub fn record_rejection(&self, rejection: Rejection) {
        let counter = match rejection {
            Rejection::Malformed => &self.malformed,
            Rejection::UnsupportedScheme => &self.unsupported_scheme,
            Rejection::Excluded => &self.excluded,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Totals for a finished crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub admitted: usize,
    /// Fetches that got an HTTP response (any status).
    pub fetched: usize,
    /// Fetches that ended in a transport error or were cancelled.
    pub failed: usize,
    /// Admitted targets never fetched because the crawl was cancelled.
    pub abandoned: usize,
    pub links_found: usize,
    pub duplicate_links: usize,
    pub malformed_links: usize,
    pub unsupported_links: usize,
    pub excluded_links: usize,
    pub elapsed: Duration,
}

pub struct Crawler {
    seed: Url,
    limits: CrawlLimits,
    concurrency: usize,
    max_time: Option<Duration>,
    follow_error_pages: bool,
    fetcher: Arc<dyn Fetcher>,
    normalizer: Arc<Normalizer>,
}

impl Crawler {
    pub fn new(config: &CrawlConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            seed: config.seed.clone(),
            limits: config.limits,
            // from_cli rejects 0, but a hand-built config could still carry it.
            concurrency: config.concurrency.max(1),
            max_time: config.max_time,
            follow_error_pages: config.follow_error_pages,
            fetcher,
            normalizer: Arc::new(Normalizer::new(config.exclude.clone())),
        }
    }

    /// A result channel sized for this crawl: one slot per worker, so a
    /// slow consumer stalls the workers instead of growing a buffer.
    pub fn result_channel(&self) -> (mpsc::Sender<CrawlResult>, mpsc::Receiver<CrawlResult>) {
        mpsc::channel(self.concurrency)
    }

    /// Crawls from the seed until the frontier is exhausted or `cancel`
    /// fires. Every admitted target that a worker picked up yields exactly
    /// one result on `results`; the channel is closed when this returns.
    pub async fn run(
        &self,
        results: mpsc::Sender<CrawlResult>,
        cancel: CancellationToken,
    ) -> CrawlSummary {
        let started = Instant::now();
        let frontier = Arc::new(Frontier::new(self.limits));
        let stats = Arc::new(CrawlStats::default());

        info!(
            seed = %self.seed,
            max_depth = self.limits.max_depth,
            max_pages = self.limits.max_pages,
            concurrency = self.concurrency,
            "starting crawl"
        );
        frontier.seed(self.seed.clone());

        // Whatever cancels the crawl (deadline, dead sink, Ctrl-C), the
        // frontier stops admitting and wakes every idle worker.
        let watchdog = {
            let frontier = Arc::clone(&frontier);
            let cancel = cancel.clone();
            let max_time = self.max_time;
            tokio::spawn(async move {
                match max_time {
                    Some(limit) => {
                        tokio::select! {
                            _ = cancel.cancelled() => {}
                            _ = tokio::time::sleep(limit) => {
                                warn!(?limit, "crawl deadline reached, cancelling");
                                cancel.cancel();
                            }
                        }
                    }
                    None => cancel.cancelled().await,
                }
                frontier.close();
            })
        };

        let workers: Vec<_> = (0..self.concurrency)
            .map(|id| {
                let worker = Worker {
                    id,
                    frontier: Arc::clone(&frontier),
                    fetcher: Arc::clone(&self.fetcher),
                    normalizer: Arc::clone(&self.normalizer),
                    results: results.clone(),
                    cancel: cancel.clone(),
                    stats: Arc::clone(&stats),
                    follow_error_pages: self.follow_error_pages,
                };
                tokio::spawn(worker.run())
            })
            .collect();

        // Only the workers hold senders now.
        drop(results);

        for outcome in join_all(workers).await {
            if let Err(e) = outcome {
                error!(error = %e, "worker task failed");
            }
        }

        watchdog.abort();
        // Workers that quit on a dead sink can leave targets queued, and
        // the watchdog may not have run yet. Closing again is harmless.
        frontier.close();
        frontier.finish();
        debug_assert_eq!(frontier.outstanding(), 0);
        debug_assert_eq!(frontier.phase(), CrawlPhase::Done);

        let summary = CrawlSummary {
            admitted: frontier.admitted(),
            fetched: stats.fetched.load(Ordering::Relaxed),
            failed: stats.failed.load(Ordering::Relaxed),
            abandoned: frontier.abandoned(),
            links_found: stats.links_found.load(Ordering::Relaxed),
            duplicate_links: stats.duplicates.load(Ordering::Relaxed),
            malformed_links: stats.malformed.load(Ordering::Relaxed),
            unsupported_links: stats.unsupported_scheme.load(Ordering::Relaxed),
            excluded_links: stats.excluded.load(Ordering::Relaxed),
            elapsed: started.elapsed(),
        };

        info!(
            admitted = summary.admitted,
            fetched = summary.fetched,
            failed = summary.failed,
            abandoned = summary.abandoned,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "crawl finished"
        );

        summary
    }
}
