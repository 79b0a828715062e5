//! Crawl coordinator: owns the worker pool and the run lifecycle
//!
//! The coordinator seeds the frontier, spawns the fixed worker pool on a
//! shared cancellation token, joins the workers, and only then closes the
//! queue. Close-before-join would be unsound here because workers produce
//! work while consuming it: the queue can be transiently empty while a
//! worker is mid-fetch and about to push children. "All workers have
//! exited" is the fact that makes the close + drain signal deterministic.

use crate::config::{validate, CrawlConfig};
use crate::crawler::extractor::{HtmlLinkExtractor, LinkExtractor};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::worker::{CrawlShared, Worker};
use crate::frontier::{FrontierQueue, WorkItem};
use crate::robots::RobotsPolicy;
use crate::url::{extract_host, normalize_url};
use crate::CrawlError;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// How a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// The frontier drained with no work left anywhere
    Completed,
    /// The timeout (or an external cancel) fired first
    Cancelled,
}

/// Lifecycle states of a crawl run, logged as the run progresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrawlState {
    Seeded,
    Running,
    Draining,
    Completed,
    Cancelled,
    Failed,
}

/// Final summary of a crawl run
#[derive(Debug)]
pub struct CrawlResult {
    /// Normalized URLs successfully fetched, sorted for determinism
    pub visited: Vec<String>,
    /// URLs dropped after exhausting their retries
    pub error_count: usize,
    /// Wall-clock duration of the run
    pub duration: Duration,
    pub outcome: CrawlOutcome,
}

impl fmt::Display for CrawlResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages visited, {} errors in {:.2}s{}",
            self.visited.len(),
            self.error_count,
            self.duration.as_secs_f64(),
            match self.outcome {
                CrawlOutcome::Completed => "",
                CrawlOutcome::Cancelled => " (cancelled)",
            }
        )
    }
}

/// Owns the configuration and HTTP client for crawl runs
pub struct Coordinator {
    config: CrawlConfig,
    extractor: Arc<dyn LinkExtractor>,
}

impl Coordinator {
    /// Creates a coordinator with the default HTML link extractor
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        Self::with_extractor(config, Arc::new(HtmlLinkExtractor::new()))
    }

    /// Creates a coordinator with a custom link extractor
    pub fn with_extractor(
        config: CrawlConfig,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Result<Self, CrawlError> {
        validate(&config)?;
        Ok(Self { config, extractor })
    }

    /// Runs a crawl from `start_url` to completion, cancellation, or failure
    ///
    /// Per-URL fetch failures are retried and counted, never fatal: a run
    /// that hits them still returns `Ok` with the aggregate error count. A
    /// timed-out run returns `Ok` with partial results and
    /// [`CrawlOutcome::Cancelled`]. Only an invalid start URL, a
    /// configuration error, or an unexpected worker failure returns `Err`.
    pub async fn start(&self, start_url: &str) -> Result<CrawlResult, CrawlError> {
        let started = Instant::now();

        let seed = normalize_url(start_url)
            .map_err(|e| CrawlError::InvalidStartUrl(format!("{}: {}", start_url, e)))?;
        let seed_host = extract_host(&seed)
            .ok_or_else(|| CrawlError::InvalidStartUrl(format!("{}: no host", start_url)))?;

        // Allow-list defaults to the start URL's host.
        let allowed_hosts: HashSet<String> = if self.config.allowed_domains.is_empty() {
            [seed_host].into_iter().collect()
        } else {
            self.config
                .allowed_domains
                .iter()
                .map(|d| d.to_lowercase())
                .collect()
        };

        let client = build_http_client(&self.config.user_agent)?;
        let robots = self
            .config
            .respect_robots
            .then(|| RobotsPolicy::new(client.clone(), self.config.user_agent.clone()));

        let frontier = Arc::new(FrontierQueue::new());
        let shared = Arc::new(CrawlShared {
            config: self.config.clone(),
            client,
            extractor: self.extractor.clone(),
            robots,
            frontier: frontier.clone(),
            visited: Mutex::new(HashSet::new()),
            errors: AtomicUsize::new(0),
            allowed_hosts,
        });

        let mut state = CrawlState::Seeded;
        tracing::info!(url = seed.as_str(), state = ?state, "Seeding crawl");
        frontier
            .push(WorkItem::new(seed, 0))
            .map_err(|_| CrawlError::QueueClosed)?;

        let cancel = CancellationToken::new();
        let timeout_guard = self.config.timeout().map(|timeout| {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                tracing::info!("Crawl timeout reached, cancelling");
                cancel.cancel();
            })
        });

        state = CrawlState::Running;
        tracing::info!(
            workers = self.config.workers,
            max_depth = self.config.max_depth,
            state = ?state,
            "Starting worker pool"
        );

        let handles: Vec<_> = (0..self.config.workers)
            .map(|id| {
                let worker = Worker::new(id, shared.clone());
                let cancel = cancel.clone();
                tokio::spawn(worker.run(cancel))
            })
            .collect();

        // Join every worker before closing the queue: only once no producer
        // can exist does Close() + Done() become a deterministic drain check.
        let mut cancelled = false;
        let mut fatal: Option<CrawlError> = None;
        for handle in handles {
            match handle.await? {
                Ok(()) => {}
                Err(CrawlError::Cancelled) => cancelled = true,
                Err(e) => {
                    tracing::error!("Worker failed: {}", e);
                    fatal.get_or_insert(e);
                }
            }
        }

        if let Some(guard) = timeout_guard {
            guard.abort();
        }

        if let Some(e) = fatal {
            state = CrawlState::Failed;
            tracing::error!(state = ?state, "Crawl failed");
            return Err(e);
        }

        frontier.close();
        if cancelled {
            state = CrawlState::Cancelled;
        } else {
            state = CrawlState::Draining;
            tracing::debug!(state = ?state, "Waiting for frontier drain signal");
            frontier.done().await;
            state = CrawlState::Completed;
        }

        let visited = {
            let mut visited: Vec<String> = shared
                .visited
                .lock()
                .expect("visited lock poisoned")
                .iter()
                .cloned()
                .collect();
            visited.sort();
            visited
        };

        let result = CrawlResult {
            visited,
            error_count: shared.errors.load(Ordering::Relaxed),
            duration: started.elapsed(),
            outcome: if cancelled {
                CrawlOutcome::Cancelled
            } else {
                CrawlOutcome::Completed
            },
        };

        tracing::info!(state = ?state, "Crawl finished: {}", result);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_start_url_fails_fast() {
        let coordinator = Coordinator::new(CrawlConfig::default()).unwrap();
        let result = coordinator.start("not a url").await;
        assert!(matches!(result, Err(CrawlError::InvalidStartUrl(_))));
    }

    #[tokio::test]
    async fn test_start_url_without_host_fails_fast() {
        let coordinator = Coordinator::new(CrawlConfig::default()).unwrap();
        let result = coordinator.start("ftp://example.com/").await;
        assert!(matches!(result, Err(CrawlError::InvalidStartUrl(_))));
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = CrawlConfig {
            workers: 0,
            ..CrawlConfig::default()
        };
        assert!(matches!(
            Coordinator::new(config),
            Err(CrawlError::Config(_))
        ));
    }

    #[test]
    fn test_result_display() {
        let result = CrawlResult {
            visited: vec!["https://example.com/".to_string()],
            error_count: 2,
            duration: Duration::from_millis(1500),
            outcome: CrawlOutcome::Cancelled,
        };
        let text = result.to_string();
        assert!(text.contains("1 pages visited"));
        assert!(text.contains("2 errors"));
        assert!(text.contains("(cancelled)"));
    }
}
