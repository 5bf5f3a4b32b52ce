use serde::Deserialize;
use std::time::Duration;

/// Default number of fetch workers
pub const DEFAULT_WORKERS: usize = 8;

/// Default frontier capacity
pub const DEFAULT_BUFFER_SIZE: usize = 2500;

/// Default aggregate request rate across all workers
pub const DEFAULT_RATE_PER_SEC: u32 = 10;

/// Default number of idle HTTP connections kept per host
pub const DEFAULT_HTTP_WORKERS: usize = 8;

/// Default per-fetch timeout (milliseconds)
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 1750;

/// Default idle window (milliseconds); slightly longer than the HTTP timeout
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 1800;

/// Default global deadline (milliseconds)
pub const DEFAULT_DEADLINE_MS: i64 = 120_000;

/// Highest accepted request rate; one request per nanosecond
pub const MAX_RATE_PER_SEC: u32 = 1_000_000_000;

/// Largest accepted worker count and frontier capacity
pub const MAX_QUEUE_CAPACITY: usize = tokio::sync::Semaphore::MAX_PERMITS;

/// Longest accepted timeout or deadline (one year, in milliseconds)
pub const MAX_TIMEOUT_MS: u64 = 365 * 24 * 60 * 60 * 1000;

/// URL suffixes that are never followed by default
pub const DEFAULT_SKIP_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".heic", ".svg"];

/// Configuration for a single crawl
///
/// Every crawl gets its own copy, so several crawls can run side by side
/// in one process.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Crawl root; discovered links must contain it to be followed
    pub base_url: String,

    /// Terms searched for, case-insensitively, on every line of every page
    pub search_terms: Vec<String>,

    /// Number of concurrent fetch workers
    pub workers: usize,

    /// Capacity of the frontier queue
    pub buffer_size: usize,

    /// Aggregate fetch rate (requests per second)
    pub rate_per_sec: u32,

    /// Maximum idle HTTP connections kept per host
    pub http_workers: usize,

    /// Per-fetch timeout (milliseconds)
    pub http_timeout_ms: u64,

    /// Quiet period after which the crawl is considered finished (milliseconds)
    pub idle_timeout_ms: u64,

    /// Wall-clock budget for the whole crawl (milliseconds, zero or negative for none)
    pub deadline_ms: i64,

    /// URL suffixes that are never followed
    pub skip_suffixes: Vec<String>,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            search_terms: Vec::new(),
            workers: DEFAULT_WORKERS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            rate_per_sec: DEFAULT_RATE_PER_SEC,
            http_workers: DEFAULT_HTTP_WORKERS,
            http_timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            deadline_ms: DEFAULT_DEADLINE_MS,
            skip_suffixes: DEFAULT_SKIP_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            user_agent: format!("webchk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CrawlConfig {
    /// Creates a configuration with default settings for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Per-fetch timeout
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// Idle window
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Global deadline, or `None` when the crawl is unbounded
    pub fn deadline(&self) -> Option<Duration> {
        u64::try_from(self.deadline_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}
