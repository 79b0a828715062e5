//! Frontier queue: the concurrency-safe work list shared by all fetch workers
//!
//! The frontier is not a one-shot work list: the same workers that drain it
//! also refill it with newly discovered links. That duality means "queue is
//! empty" alone can never prove the crawl is over (a worker may be mid-fetch
//! and about to push children), so the queue tracks a pending counter:
//! every push increments it, and every terminal pop is acknowledged with
//! [`FrontierQueue::item_done`], which decrements it. `pending == 0` with an
//! empty queue is the unique condition under which no further work can ever
//! arrive, and blocked consumers observe it as [`QueueError::Closed`].

use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::{watch, Notify};
use tokio_util::sync::CancellationToken;
use url::Url;

/// One queued crawl task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// The URL to fetch
    pub url: Url,

    /// Link distance from the start URL
    pub depth: u32,

    /// How many times this fetch has already failed
    pub retries: u32,
}

impl WorkItem {
    /// Creates a fresh item for a newly discovered URL
    pub fn new(url: Url, depth: u32) -> Self {
        Self {
            url,
            depth,
            retries: 0,
        }
    }

    /// Returns a copy of this item with the retry count bumped
    pub fn retried(&self) -> Self {
        Self {
            url: self.url.clone(),
            depth: self.depth,
            retries: self.retries + 1,
        }
    }
}

/// Control-flow signals returned by queue operations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue is closed (or provably drained) and will never yield again
    #[error("queue closed")]
    Closed,

    /// The cancellation token fired while waiting for an item
    #[error("pop cancelled")]
    Cancelled,
}

/// Queue state guarded by a single lock.
///
/// `pending` counts items that have been pushed but not yet acknowledged via
/// `item_done` - both queued items and items currently held by a worker.
struct Inner {
    items: VecDeque<WorkItem>,
    pending: usize,
    closed: bool,
}

/// Unbounded FIFO of pending work items with blocking, cancellable pop and
/// pending-counter drain detection.
pub struct FrontierQueue {
    inner: Mutex<Inner>,
    /// Wakes blocked consumers on push, drain, and close
    notify: Notify,
    done_tx: watch::Sender<bool>,
    done_rx: watch::Receiver<bool>,
}

impl FrontierQueue {
    pub fn new() -> Self {
        let (done_tx, done_rx) = watch::channel(false);
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                pending: 0,
                closed: false,
            }),
            notify: Notify::new(),
            done_tx,
            done_rx,
        }
    }

    /// Appends an item and wakes a blocked consumer.
    ///
    /// The pending counter is incremented under the same lock that makes the
    /// item observable, so a concurrent drain check can never miss it.
    pub fn push(&self, item: WorkItem) -> Result<(), QueueError> {
        {
            let mut inner = self.inner.lock().expect("frontier lock poisoned");
            if inner.closed {
                return Err(QueueError::Closed);
            }
            inner.pending += 1;
            inner.items.push_back(item);
        }
        self.notify.notify_waiters();
        Ok(())
    }

    /// Blocks until an item is available, the queue is drained or closed
    /// (`Closed`), or the cancellation token fires (`Cancelled`).
    ///
    /// Each item is handed to exactly one caller. A popped item stays counted
    /// in `pending` until the caller acknowledges it with [`Self::item_done`].
    pub async fn pop(&self, cancel: &CancellationToken) -> Result<WorkItem, QueueError> {
        loop {
            // Register for wakeups before inspecting state, so a push that
            // lands between the check and the await is not lost.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut inner = self.inner.lock().expect("frontier lock poisoned");
                if let Some(item) = inner.items.pop_front() {
                    return Ok(item);
                }
                if inner.closed || inner.pending == 0 {
                    return Err(QueueError::Closed);
                }
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = cancel.cancelled() => return Err(QueueError::Cancelled),
            }
        }
    }

    /// Acknowledges that a popped item reached a terminal state (processed,
    /// retries exhausted, or skipped).
    ///
    /// Callers that re-enqueue (retries, discovered children) must push
    /// before acknowledging, otherwise the counter can transiently hit zero
    /// and release every blocked consumer with a spurious drain.
    pub fn item_done(&self) {
        let signal_done = {
            let mut inner = self.inner.lock().expect("frontier lock poisoned");
            debug_assert!(inner.pending > 0, "item_done without matching push");
            inner.pending = inner.pending.saturating_sub(1);
            let drained = inner.pending == 0 && inner.items.is_empty();
            if drained {
                // Wake blocked consumers so they observe the drain.
                self.notify.notify_waiters();
            }
            drained && inner.closed
        };
        if signal_done {
            let _ = self.done_tx.send(true);
        }
    }

    /// Marks the queue closed to new pushes.
    ///
    /// Already-queued items can still be drained. The coordinator only calls
    /// this after every worker has exited, so no push can race it; at that
    /// point [`Self::done`] becomes a deterministic drain signal.
    pub fn close(&self) {
        let signal_done = {
            let mut inner = self.inner.lock().expect("frontier lock poisoned");
            inner.closed = true;
            inner.pending == 0 && inner.items.is_empty()
        };
        self.notify.notify_waiters();
        if signal_done {
            let _ = self.done_tx.send(true);
        }
    }

    /// Resolves exactly once, when the queue is closed and fully drained.
    pub async fn done(&self) {
        let mut rx = self.done_rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Number of queued (not yet popped) items
    pub fn len(&self) -> usize {
        self.inner.lock().expect("frontier lock poisoned").items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of unacknowledged items (queued plus in-flight)
    pub fn pending(&self) -> usize {
        self.inner.lock().expect("frontier lock poisoned").pending
    }
}

impl Default for FrontierQueue {
    fn default() -> Self {
        Self::new()
    }
}
