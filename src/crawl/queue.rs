// src/crawl/queue.rs
// =============================================================================
// The frontier: the queue of pages waiting to be fetched.
//
// How it works:
// 1. The seed is admitted at depth 0 and the crawl moves to Running
// 2. Workers call next() to take the oldest target (FIFO, so roughly
//    breadth-first)
// 3. While processing a page, a worker admits the links it found
// 4. When it is done with the page it calls complete()
// 5. When nothing is queued AND nothing is being processed, the crawl is
//    exhausted: every waiting worker is woken and gets None
//
// Why count "outstanding" instead of looking at the queue length?
// - The queue can be empty while a worker is still fetching a page that
//   will add ten more links. Only when the number of admitted-but-unfinished
//   targets hits zero do we know no more work can ever appear.
//
// Admission is one critical section: visited check, depth/page limits,
// marking visited, counting, and queueing all happen under the same lock,
// so two workers racing on the same URL admit it exactly once.
//
// The lock is a plain std Mutex and is never held across an .await;
// workers that find the queue empty park on a tokio Notify instead.
// =============================================================================

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tracing::trace;
use url::Url;

use super::visited::VisitedSet;
use super::{CrawlLimits, CrawlTarget};

/// Lifecycle of a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    /// Created, seed not admitted yet.
    Idle,
    /// Workers are pulling targets.
    Running,
    /// No more work will be handed out; workers are exiting.
    Draining,
    /// Every worker has exited and the result stream is closed.
    Done,
}

/// Outcome of trying to admit a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    AlreadyVisited,
    TooDeep,
    PageLimitReached,
    /// The crawl is not running (not started, draining or done).
    Closed,
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

#[derive(Debug)]
struct FrontierState {
    phase: CrawlPhase,
    visited: VisitedSet,
    queue: VecDeque<CrawlTarget>,
    /// Total ever admitted. Never decreases.
    admitted: usize,
    /// Admitted but not yet completed (queued + being processed).
    outstanding: usize,
    /// Queued targets dropped because the crawl was cancelled.
    abandoned: usize,
}

#[derive(Debug)]
pub struct Frontier {
    limits: CrawlLimits,
    state: Mutex<FrontierState>,
    changed: Notify,
}

impl Frontier {
    pub fn new(limits: CrawlLimits) -> Self {
        Self {
            limits,
            state: Mutex::new(FrontierState {
                phase: CrawlPhase::Idle,
                visited: VisitedSet::new(),
                queue: VecDeque::new(),
                admitted: 0,
                outstanding: 0,
                abandoned: 0,
            }),
            changed: Notify::new(),
        }
    }

    pub fn limits(&self) -> CrawlLimits {
        self.limits
    }

    /// Idle -> Running: admits the seed at depth 0.
    pub fn seed(&self, url: Url) -> Admission {
        {
            let mut state = self.lock();
            if state.phase != CrawlPhase::Idle {
                return Admission::Closed;
            }
            state.phase = CrawlPhase::Running;
        }
        self.try_admit(CrawlTarget { url, depth: 0 })
    }

    /// Admits `target` unless it was already seen or a limit forbids it.
    ///
    /// A rejected candidate leaves no trace: it is not marked visited and
    /// not counted.
    pub fn try_admit(&self, target: CrawlTarget) -> Admission {
        let admission = {
            let mut state = self.lock();

            if state.phase != CrawlPhase::Running {
                Admission::Closed
            } else if state.visited.contains(&target.url) {
                Admission::AlreadyVisited
            } else if self.limits.max_depth > 0 && target.depth > self.limits.max_depth {
                Admission::TooDeep
            } else if self.limits.max_pages > 0 && state.admitted >= self.limits.max_pages {
                Admission::PageLimitReached
            } else {
                state.visited.insert(&target.url);
                state.admitted += 1;
                state.outstanding += 1;
                trace!(url = %target.url, depth = target.depth, "admitted");
                state.queue.push_back(target);
                Admission::Admitted
            }
        };

        if admission.is_admitted() {
            self.changed.notify_waiters();
        }
        admission
    }

    /// Waits for the next target. Returns None once the crawl is exhausted
    /// or closed.
    pub async fn next(&self) -> Option<CrawlTarget> {
        loop {
            // Register interest BEFORE looking at the state, so a
            // notification sent between the check and the await is not lost.
            let changed = self.changed.notified();
            tokio::pin!(changed);
            changed.as_mut().enable();

            {
                let mut state = self.lock();
                if state.phase != CrawlPhase::Running {
                    return None;
                }
                if let Some(target) = state.queue.pop_front() {
                    return Some(target);
                }
            }

            changed.await;
        }
    }

    /// Marks one target returned by next() as finished.
    ///
    /// Call it AFTER admitting the links found on that page, otherwise the
    /// outstanding count could touch zero while work is still coming.
    pub fn complete(&self) {
        let exhausted = {
            let mut state = self.lock();
            debug_assert!(state.outstanding > 0, "complete() without a matching target");
            state.outstanding = state.outstanding.saturating_sub(1);

            if state.outstanding == 0 && state.phase == CrawlPhase::Running {
                state.phase = CrawlPhase::Draining;
                true
            } else {
                false
            }
        };

        if exhausted {
            trace!("frontier exhausted");
            self.changed.notify_waiters();
        }
    }

    /// Stops handing out and admitting work (crawl cancelled). Targets still
    /// queued are dropped and counted as abandoned.
    pub fn close(&self) {
        {
            let mut state = self.lock();
            if state.phase == CrawlPhase::Done {
                return;
            }
            let dropped = state.queue.len();
            state.queue.clear();
            state.abandoned += dropped;
            state.outstanding = state.outstanding.saturating_sub(dropped);
            state.phase = CrawlPhase::Draining;
        }
        self.changed.notify_waiters();
    }

    /// Draining -> Done, once every worker has exited.
    pub fn finish(&self) {
        let mut state = self.lock();
        debug_assert_eq!(state.visited.len(), state.admitted);
        state.phase = CrawlPhase::Done;
    }

    pub fn phase(&self) -> CrawlPhase {
        self.lock().phase
    }

    pub fn admitted(&self) -> usize {
        self.lock().admitted
    }

    pub fn outstanding(&self) -> usize {
        self.lock().outstanding
    }

    pub fn abandoned(&self) -> usize {
        self.lock().abandoned
    }

    // A panic while holding the lock cannot leave the state half-updated
    // (every critical section is a handful of plain assignments), so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn target(s: &str, depth: usize) -> CrawlTarget {
        CrawlTarget { url: url(s), depth }
    }

    fn unlimited() -> CrawlLimits {
        CrawlLimits { max_depth: 0, max_pages: 0 }
    }

    #[test]
    fn test_seed_starts_the_crawl() {
        let frontier = Frontier::new(unlimited());
        assert_eq!(frontier.phase(), CrawlPhase::Idle);
        assert_eq!(frontier.try_admit(target("http://a.test/", 0)), Admission::Closed);

        assert_eq!(frontier.seed(url("http://a.test/")), Admission::Admitted);
        assert_eq!(frontier.phase(), CrawlPhase::Running);
        assert_eq!(frontier.admitted(), 1);
        assert_eq!(frontier.seed(url("http://a.test/other")), Admission::Closed);
    }

    #[test]
    fn test_duplicate_is_rejected_without_side_effects() {
        let frontier = Frontier::new(unlimited());
        frontier.seed(url("http://a.test/"));

        assert_eq!(frontier.try_admit(target("http://a.test/b", 1)), Admission::Admitted);
        assert_eq!(frontier.try_admit(target("http://a.test/b", 1)), Admission::AlreadyVisited);
        assert_eq!(frontier.try_admit(target("http://a.test/", 1)), Admission::AlreadyVisited);
        assert_eq!(frontier.admitted(), 2);
        assert_eq!(frontier.outstanding(), 2);
    }

    #[test]
    fn test_depth_limit() {
        let frontier = Frontier::new(CrawlLimits { max_depth: 1, max_pages: 0 });
        frontier.seed(url("http://a.test/"));

        assert_eq!(frontier.try_admit(target("http://a.test/1", 1)), Admission::Admitted);
        assert_eq!(frontier.try_admit(target("http://a.test/2", 2)), Admission::TooDeep);
        // A rejected URL is not marked visited: it can still come in shallower.
        assert_eq!(frontier.try_admit(target("http://a.test/2", 1)), Admission::Admitted);
    }

    #[test]
    fn test_page_limit() {
        let frontier = Frontier::new(CrawlLimits { max_depth: 0, max_pages: 2 });
        frontier.seed(url("http://a.test/"));

        assert_eq!(frontier.try_admit(target("http://a.test/1", 1)), Admission::Admitted);
        assert_eq!(frontier.try_admit(target("http://a.test/2", 1)), Admission::PageLimitReached);
        assert_eq!(frontier.admitted(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_only_when_nothing_is_outstanding() {
        let frontier = Frontier::new(unlimited());
        frontier.seed(url("http://a.test/"));

        let seed = frontier.next().await.unwrap();
        assert_eq!(seed.depth, 0);

        // Queue is empty but the seed is still being processed.
        frontier.try_admit(target("http://a.test/child", 1));
        frontier.complete();
        assert_eq!(frontier.phase(), CrawlPhase::Running);

        let child = frontier.next().await.unwrap();
        assert_eq!(child.url.as_str(), "http://a.test/child");
        frontier.complete();

        assert_eq!(frontier.phase(), CrawlPhase::Draining);
        assert!(frontier.next().await.is_none());
        assert_eq!(frontier.try_admit(target("http://a.test/late", 1)), Admission::Closed);
    }

    #[tokio::test]
    async fn test_waiting_worker_is_woken_by_new_work() {
        let frontier = Arc::new(Frontier::new(unlimited()));
        frontier.seed(url("http://a.test/"));
        let _seed = frontier.next().await.unwrap();

        let waiter = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.next().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        frontier.try_admit(target("http://a.test/new", 1));
        let got = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.unwrap().url.as_str(), "http://a.test/new");
    }

    #[tokio::test]
    async fn test_all_waiters_released_on_exhaustion() {
        let frontier = Arc::new(Frontier::new(unlimited()));
        frontier.seed(url("http://a.test/"));
        let _seed = frontier.next().await.unwrap();

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let frontier = Arc::clone(&frontier);
                tokio::spawn(async move { frontier.next().await })
            })
            .collect();
        tokio::time::sleep(Duration::from_millis(20)).await;

        frontier.complete();
        for waiter in waiters {
            let got = tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .unwrap()
                .unwrap();
            assert!(got.is_none());
        }
    }

    #[tokio::test]
    async fn test_close_abandons_queue_and_releases_waiters() {
        let frontier = Arc::new(Frontier::new(unlimited()));
        frontier.seed(url("http://a.test/"));
        let _seed = frontier.next().await.unwrap();
        frontier.try_admit(target("http://a.test/1", 1));
        frontier.try_admit(target("http://a.test/2", 1));

        frontier.close();
        assert_eq!(frontier.phase(), CrawlPhase::Draining);
        assert_eq!(frontier.abandoned(), 2);
        // Only the seed (held by "a worker") is still outstanding.
        assert_eq!(frontier.outstanding(), 1);
        assert!(frontier.next().await.is_none());

        frontier.complete();
        frontier.finish();
        assert_eq!(frontier.phase(), CrawlPhase::Done);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_admissions_admit_once() {
        let frontier = Arc::new(Frontier::new(unlimited()));
        frontier.seed(url("http://a.test/"));

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let frontier = Arc::clone(&frontier);
                tokio::spawn(async move {
                    frontier.try_admit(target("http://a.test/shared", 1)).is_admitted()
                })
            })
            .collect();

        let mut admitted = 0;
        for task in tasks {
            if task.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
        assert_eq!(frontier.admitted(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_admissions_respect_page_limit() {
        let frontier = Arc::new(Frontier::new(CrawlLimits { max_depth: 0, max_pages: 10 }));
        frontier.seed(url("http://a.test/"));

        let tasks: Vec<_> = (0..100)
            .map(|i| {
                let frontier = Arc::clone(&frontier);
                tokio::spawn(async move {
                    frontier.try_admit(target(&format!("http://a.test/{}", i), 1))
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(frontier.admitted(), 10);
    }
}
