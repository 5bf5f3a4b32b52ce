//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The coordinator, which owns the frontier, the dedup filter and every stop decision
//! - The fetch worker pool and its shared rate limiter
//! - HTTP fetching, link extraction and term search for a single page

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod rate_limiter;
mod search;
mod worker;

pub use coordinator::{Crawl, CrawlReport, Dispatcher};
pub use fetcher::{build_http_client, fetch_page, HttpFetcher, PageFetcher};
pub use frontier::{frontier, Frontier, FrontierEntry, FrontierReceiver, PushError, SEED_REFERRER};
pub use parser::extract_links;
pub use rate_limiter::{Cancelled, RateLimiter};
pub use search::find_matches;
pub use worker::{Worker, WorkerEvent};

use crate::config::CrawlConfig;
use crate::WebchkError;

/// Starts a crawl over HTTP with the given configuration
///
/// This is the main entry point for the command-line tool. It validates the
/// configuration, builds the HTTP client and starts the dispatcher.
pub fn crawl(config: CrawlConfig) -> Result<Crawl, WebchkError> {
    Ok(Dispatcher::from_config(config)?.start())
}
