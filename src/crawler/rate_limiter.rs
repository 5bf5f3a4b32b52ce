//! Shared request pacing for all fetch workers
//!
//! A token bucket with a burst of one: after a quiet spell the first caller goes
//! straight through, everyone after that is spaced one period apart.

use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Returned by blocking crawl operations once the crawl has been cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("crawl cancelled")]
pub struct Cancelled;

/// Bounds the aggregate request rate across every worker of one crawl
#[derive(Debug)]
pub struct RateLimiter {
    ticks: Mutex<Interval>,
    period: Duration,
    cancel: CancellationToken,
}

impl RateLimiter {
    /// Creates a limiter allowing `rate_per_sec` acquisitions per second
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(rate_per_sec: u32, cancel: CancellationToken) -> Self {
        // rates above one per nanosecond would truncate to a zero period
        let period = (Duration::from_secs(1) / rate_per_sec.max(1)).max(Duration::from_nanos(1));
        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            ticks: Mutex::new(ticks),
            period,
            cancel,
        }
    }

    /// Time between two consecutive tokens
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Waits for a token, or returns `Cancelled` once the crawl is cancelled
    ///
    /// Waiters are served in the order they queued on the internal lock.
    pub async fn acquire(&self) -> Result<(), Cancelled> {
        let mut ticks = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(Cancelled),
            ticks = self.ticks.lock() => ticks,
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Cancelled),
            _ = ticks.tick() => Ok(()),
        }
    }
}
