//! Fetch worker: the sequential loop run by each member of the pool
//!
//! A worker pops one item at a time, fetches it, and pushes the surviving
//! child links back onto the frontier. Every suspension point (pop, robots
//! check, fetch, pacing delay) races the shared cancellation token, so a
//! worker never blocks past a cancellation.

use crate::config::CrawlConfig;
use crate::crawler::extractor::LinkExtractor;
use crate::crawler::fetcher::{fetch_url, FetchOutcome};
use crate::frontier::{FrontierQueue, QueueError, WorkItem};
use crate::robots::RobotsPolicy;
use crate::url::{extract_host, is_eligible, normalize_url};
use crate::CrawlError;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// State shared by the coordinator and every worker in the pool
pub(crate) struct CrawlShared {
    pub config: CrawlConfig,
    pub client: Client,
    pub extractor: Arc<dyn LinkExtractor>,
    pub robots: Option<RobotsPolicy>,
    pub frontier: Arc<FrontierQueue>,
    /// Normalized URLs that have been successfully fetched
    pub visited: Mutex<HashSet<String>>,
    /// URLs dropped after exhausting their retries
    pub errors: AtomicUsize,
    /// Hosts the crawler may fetch from
    pub allowed_hosts: HashSet<String>,
}

impl CrawlShared {
    fn is_visited(&self, key: &str) -> bool {
        self.visited
            .lock()
            .expect("visited lock poisoned")
            .contains(key)
    }

    /// Atomic check-then-insert; returns false if another worker got there first
    fn mark_visited(&self, key: &str) -> bool {
        self.visited
            .lock()
            .expect("visited lock poisoned")
            .insert(key.to_string())
    }
}

/// One member of the fetch pool
pub(crate) struct Worker {
    id: usize,
    shared: Arc<CrawlShared>,
}

impl Worker {
    pub fn new(id: usize, shared: Arc<CrawlShared>) -> Self {
        Self { id, shared }
    }

    /// Runs the worker loop until the frontier drains (`Ok`) or the token
    /// fires (`Err(Cancelled)`)
    pub async fn run(self, cancel: CancellationToken) -> Result<(), CrawlError> {
        loop {
            if cancel.is_cancelled() {
                tracing::debug!(worker = self.id, "Worker observed cancellation");
                return Err(CrawlError::Cancelled);
            }

            let item = match self.shared.frontier.pop(&cancel).await {
                Ok(item) => item,
                Err(QueueError::Closed) => {
                    tracing::debug!(worker = self.id, "Frontier drained, worker exiting");
                    return Ok(());
                }
                Err(QueueError::Cancelled) => return Err(CrawlError::Cancelled),
            };

            let result = self.process(&item, &cancel).await;
            // Acknowledge only after process() has pushed retries/children,
            // so the pending counter never transiently reaches zero.
            self.shared.frontier.item_done();
            result?;

            self.pace(&cancel).await?;
        }
    }

    /// Handles one popped item through to a terminal state
    async fn process(&self, item: &WorkItem, cancel: &CancellationToken) -> Result<(), CrawlError> {
        let key = item.url.as_str();

        // Second line of dedup defence: the same URL can be enqueued by two
        // different parents before either fetch lands, so re-check right
        // before the network call.
        if self.shared.is_visited(key) {
            tracing::debug!(worker = self.id, url = key, "Already visited, skipping");
            return Ok(());
        }

        if let Some(robots) = &self.shared.robots {
            let allowed = tokio::select! {
                allowed = robots.is_allowed(&item.url) => allowed,
                _ = cancel.cancelled() => return Err(CrawlError::Cancelled),
            };
            if !allowed {
                // Permanent skip, never retried, not counted as an error.
                tracing::debug!(worker = self.id, url = key, "Disallowed by robots.txt");
                return Ok(());
            }
        }

        tracing::debug!(worker = self.id, url = key, depth = item.depth, "Fetching");
        let outcome = tokio::select! {
            outcome = fetch_url(&self.shared.client, &item.url) => outcome,
            _ = cancel.cancelled() => return Err(CrawlError::Cancelled),
        };

        match outcome {
            FetchOutcome::Success { status, body, is_html } => {
                if !self.shared.mark_visited(key) {
                    // Lost the race to a duplicate enqueued by another
                    // parent; its children are already accounted for.
                    return Ok(());
                }
                tracing::debug!(worker = self.id, url = key, status, "Fetched");
                if is_html {
                    self.enqueue_children(item, &body);
                }
            }
            FetchOutcome::Failed { reason } => {
                self.handle_failure(item, &reason);
            }
        }

        Ok(())
    }

    /// Filters a page's links and pushes the survivors at `depth + 1`
    fn enqueue_children(&self, parent: &WorkItem, body: &str) {
        if parent.depth >= self.shared.config.max_depth {
            return;
        }

        let links = self.shared.extractor.extract(body, &parent.url);
        for raw in links {
            if !is_eligible(&raw) {
                continue;
            }

            let child = match normalize_url(&raw) {
                Ok(url) => url,
                Err(_) => continue,
            };

            let in_scope = extract_host(&child)
                .map(|host| self.shared.allowed_hosts.contains(&host))
                .unwrap_or(false);
            if !in_scope {
                continue;
            }

            if self.shared.is_visited(child.as_str()) {
                continue;
            }

            let work = WorkItem::new(child, parent.depth + 1);
            if let Err(e) = self.shared.frontier.push(work) {
                // Only possible once the queue is closed, i.e. after every
                // worker has exited; log and move on.
                tracing::warn!(worker = self.id, "Dropping discovered link: {}", e);
                return;
            }
        }
    }

    /// Re-enqueues a failed fetch or counts it as exhausted
    fn handle_failure(&self, item: &WorkItem, reason: &str) {
        if item.retries < self.shared.config.max_retries {
            tracing::debug!(
                worker = self.id,
                url = item.url.as_str(),
                attempt = item.retries + 1,
                "Fetch failed ({}), re-queueing",
                reason
            );
            if let Err(e) = self.shared.frontier.push(item.retried()) {
                tracing::warn!(worker = self.id, "Dropping retry: {}", e);
                self.shared.errors.fetch_add(1, Ordering::Relaxed);
            }
        } else {
            tracing::warn!(
                worker = self.id,
                url = item.url.as_str(),
                "Retries exhausted ({}), dropping",
                reason
            );
            self.shared.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Pacing delay between fetches issued by this worker
    async fn pace(&self, cancel: &CancellationToken) -> Result<(), CrawlError> {
        let delay = self.shared.config.delay();
        if delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => Ok(()),
            _ = cancel.cancelled() => Err(CrawlError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::build_http_client;

    struct FixedLinks(Vec<String>);

    impl LinkExtractor for FixedLinks {
        fn extract(&self, _body: &str, _base: &url::Url) -> Vec<String> {
            self.0.clone()
        }
    }

    fn shared_with_links(links: Vec<&str>, max_depth: u32) -> Arc<CrawlShared> {
        let config = CrawlConfig {
            max_depth,
            ..CrawlConfig::default()
        };
        Arc::new(CrawlShared {
            client: build_http_client(&config.user_agent).unwrap(),
            config,
            extractor: Arc::new(FixedLinks(links.into_iter().map(String::from).collect())),
            robots: None,
            frontier: Arc::new(FrontierQueue::new()),
            visited: Mutex::new(HashSet::new()),
            errors: AtomicUsize::new(0),
            allowed_hosts: ["example.com".to_string()].into_iter().collect(),
        })
    }

    fn parent(depth: u32) -> WorkItem {
        WorkItem::new(url::Url::parse("https://example.com/parent").unwrap(), depth)
    }

    #[test]
    fn test_enqueue_children_filters_and_pushes() {
        let shared = shared_with_links(
            vec![
                "https://example.com/good",
                "https://elsewhere.com/off-domain",
                "https://example.com/image.png",
                "https://example.com/frag#section",
                "not a url",
            ],
            2,
        );
        let worker = Worker::new(0, shared.clone());

        worker.enqueue_children(&parent(0), "");
        assert_eq!(shared.frontier.len(), 1);
    }

    #[test]
    fn test_enqueue_children_respects_depth_bound() {
        let shared = shared_with_links(vec!["https://example.com/too-deep"], 1);
        let worker = Worker::new(0, shared.clone());

        // Parent sits at the depth bound: nothing may be enqueued.
        worker.enqueue_children(&parent(1), "");
        assert_eq!(shared.frontier.len(), 0);
    }

    #[test]
    fn test_enqueue_children_skips_visited() {
        let shared = shared_with_links(vec!["https://example.com/seen"], 2);
        shared.mark_visited("https://example.com/seen");
        let worker = Worker::new(0, shared.clone());

        worker.enqueue_children(&parent(0), "");
        assert_eq!(shared.frontier.len(), 0);
    }

    #[test]
    fn test_handle_failure_requeues_then_counts() {
        let shared = shared_with_links(vec![], 2);
        let worker = Worker::new(0, shared.clone());

        let fresh = parent(0);
        worker.handle_failure(&fresh, "HTTP 503");
        assert_eq!(shared.frontier.len(), 1);
        assert_eq!(shared.errors.load(Ordering::Relaxed), 0);

        let exhausted = WorkItem {
            retries: shared.config.max_retries,
            ..parent(0)
        };
        worker.handle_failure(&exhausted, "HTTP 503");
        assert_eq!(shared.frontier.len(), 1);
        assert_eq!(shared.errors.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_mark_visited_is_idempotent() {
        let shared = shared_with_links(vec![], 2);
        assert!(shared.mark_visited("https://example.com/a"));
        assert!(!shared.mark_visited("https://example.com/a"));
    }
}
