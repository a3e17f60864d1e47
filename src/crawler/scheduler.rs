//! Work queue for the crawl frontier
//!
//! This module handles:
//! - Queueing pending visits discovered by running tasks
//! - Tracking outstanding work (queued plus in flight)
//! - Signalling the dispatcher once the last unit of work completes
//! - Gating network concurrency with a fixed pool of fetch slots

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};
use url::Url;

/// One pending visit: a URL and the page that linked to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// The URL to visit
    pub url: Url,

    /// The page the URL was discovered on; `None` for seeds
    pub referrer: Option<Url>,
}

impl CrawlTask {
    /// Creates a task for a seed URL
    pub fn seed(url: Url) -> Self {
        Self {
            url,
            referrer: None,
        }
    }

    /// Creates a task for a link found on `referrer`
    pub fn discovered(url: Url, referrer: Url) -> Self {
        Self {
            url,
            referrer: Some(referrer),
        }
    }
}

/// Concurrent queue of crawl tasks with a completion counter
///
/// `pending` counts tasks that have been pushed but not yet completed. A task
/// pushes its children before it completes, so the counter only reaches zero
/// once the whole crawl has drained.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<CrawlTask>>,
    pending: AtomicUsize,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task to the queue
    pub fn push(&self, task: CrawlTask) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(task);
        self.notify.notify_one();
    }

    /// Waits for the next task
    ///
    /// Returns `None` once the queue is empty and no task is in flight.
    pub async fn next(&self) -> Option<CrawlTask> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent push or completion is not missed
            notified.as_mut().enable();

            if let Some(task) = self
                .queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
            {
                return Some(task);
            }

            if self.pending.load(Ordering::SeqCst) == 0 {
                return None;
            }

            notified.await;
        }
    }

    /// Marks one task as finished
    pub fn complete(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            tracing::debug!("Frontier drained");
            self.notify.notify_waiters();
        }
    }

    /// Number of tasks queued or in flight
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Number of tasks waiting to be dispatched
    pub fn queued(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Completes a frontier task when dropped, even if the task panics
pub struct PendingGuard {
    frontier: Arc<Frontier>,
}

impl PendingGuard {
    pub fn new(frontier: Arc<Frontier>) -> Self {
        Self { frontier }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.frontier.complete();
    }
}

/// Fixed pool of fetch slots
///
/// Bounds in-flight HTTP requests to the configured worker count no matter
/// how many crawl tasks exist.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    slots: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Waits for a free slot; the slot is released when the permit drops
    ///
    /// Returns `None` only if the pool has been closed.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.slots).acquire_owned().await.ok()
    }

    /// Total number of slots
    pub fn size(&self) -> usize {
        self.size
    }

    /// Slots currently free
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }
}
