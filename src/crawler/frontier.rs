//! Bounded queue of pages waiting for a fetch worker
//!
//! The coordinator is the only producer and never waits: a push that finds the
//! queue full fails at once. Workers share the receiving end and hold its lock
//! only while waiting for their next entry.

use crate::config::MAX_QUEUE_CAPACITY;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

/// Referrer recorded for the base URL
pub const SEED_REFERRER: &str = "/";

/// A page to fetch and the page that linked to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub referrer: String,
}

impl FrontierEntry {
    pub fn new(url: impl Into<String>, referrer: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            referrer: referrer.into(),
        }
    }

    /// Entry for the base URL that starts a crawl
    pub fn seed(url: impl Into<String>) -> Self {
        Self::new(url, SEED_REFERRER)
    }
}

/// Why an entry could not be queued; the entry is handed back
#[derive(Debug, Error)]
pub enum PushError {
    #[error("frontier is full")]
    Full(FrontierEntry),

    #[error("frontier is closed")]
    Closed(FrontierEntry),
}

/// Creates a frontier holding at most `capacity` entries
///
/// The receiving half stops yielding entries once `cancel` fires.
pub fn frontier(capacity: usize, cancel: CancellationToken) -> (Frontier, FrontierReceiver) {
    let capacity = capacity.clamp(1, MAX_QUEUE_CAPACITY);
    let (tx, rx) = mpsc::channel(capacity);

    let frontier = Frontier {
        tx,
        capacity,
        enqueued: 0,
    };
    let receiver = FrontierReceiver {
        rx: Arc::new(Mutex::new(rx)),
        cancel,
    };

    (frontier, receiver)
}

/// Producing half of the frontier, owned by the coordinator
#[derive(Debug)]
pub struct Frontier {
    tx: mpsc::Sender<FrontierEntry>,
    capacity: usize,
    enqueued: usize,
}

impl Frontier {
    /// Queues an entry without waiting
    pub fn try_push(&mut self, entry: FrontierEntry) -> Result<(), PushError> {
        match self.tx.try_send(entry) {
            Ok(()) => {
                self.enqueued += 1;
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(entry)) => Err(PushError::Full(entry)),
            Err(mpsc::error::TrySendError::Closed(entry)) => Err(PushError::Closed(entry)),
        }
    }

    /// Maximum number of entries waiting at once
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of entries ever queued
    pub fn enqueued(&self) -> usize {
        self.enqueued
    }
}

/// Consuming half of the frontier, shared by every worker
#[derive(Debug, Clone)]
pub struct FrontierReceiver {
    rx: Arc<Mutex<mpsc::Receiver<FrontierEntry>>>,
    cancel: CancellationToken,
}

impl FrontierReceiver {
    /// Waits for the next entry
    ///
    /// Returns `None` once the crawl is cancelled, or once the frontier has been
    /// closed and emptied.
    pub async fn next(&self) -> Option<FrontierEntry> {
        let mut rx = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            rx = self.rx.lock() => rx,
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            entry = rx.recv() => entry,
        }
    }
}
