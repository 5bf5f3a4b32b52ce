//! Crawler coordinator - the dispatcher's event loop
//!
//! The coordinator is the only task that touches the dedup filter and the only
//! producer for the frontier. It:
//! - Seeds the frontier with the base URL and starts the worker pool
//! - Filters discovered links and queues the accepted ones
//! - Forwards results to the caller's output stream
//! - Owns every decision to stop, and records exactly one reason for it

use crate::config::{validate, warnings, CrawlConfig};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::frontier::{frontier, Frontier, FrontierEntry, PushError};
use crate::crawler::rate_limiter::RateLimiter;
use crate::crawler::worker::{Worker, WorkerEvent};
use crate::state::{CrawlState, PageResult, TerminationReason};
use crate::url::{trim_trailing_slash, DedupFilter};
use crate::{ConfigError, WebchkError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Why the crawl stopped
    pub reason: TerminationReason,

    /// Entries ever queued on the frontier, the base URL included
    pub urls_enqueued: usize,

    /// Results handed to the output stream
    pub results_forwarded: usize,

    /// Distinct URLs recorded by the dedup filter
    pub urls_seen: usize,

    /// Wall-clock start of the crawl
    pub started_at: DateTime<Utc>,

    /// How long the crawl ran
    pub elapsed: Duration,
}

/// Entry point for running a crawl
///
/// # Example
///
/// ```no_run
/// use webchk::config::CrawlConfig;
/// use webchk::crawler::Dispatcher;
///
/// # async fn example() -> webchk::Result<()> {
/// let mut config = CrawlConfig::new("https://example.com");
/// config.search_terms = vec!["contact".to_string()];
///
/// let mut crawl = Dispatcher::from_config(config)?.start();
/// while let Some(result) = crawl.next().await {
///     println!("{} ({} matches)", result.url, result.matches.len());
/// }
/// let report = crawl.finish().await?;
/// println!("stopped: {}", report.reason);
/// # Ok(())
/// # }
/// ```
pub struct Dispatcher {
    config: Arc<CrawlConfig>,
    fetcher: Arc<dyn PageFetcher>,
}

impl Dispatcher {
    /// Creates a dispatcher that fetches pages with `fetcher`
    ///
    /// The configuration is validated here; soft problems are logged when the
    /// crawl starts.
    ///
    /// # Arguments
    ///
    /// * `config` - Settings for this crawl only
    /// * `fetcher` - Fetches and searches one page; shared by every worker
    ///
    /// # Returns
    ///
    /// * `Ok(Dispatcher)` - Ready to [`start`](Dispatcher::start)
    /// * `Err(ConfigError)` - The configuration failed validation
    pub fn new(config: CrawlConfig, fetcher: Arc<dyn PageFetcher>) -> Result<Self, ConfigError> {
        validate(&config)?;
        Ok(Self {
            config: Arc::new(config),
            fetcher,
        })
    }

    /// Creates a dispatcher using an HTTP fetcher built from the configuration
    pub fn from_config(config: CrawlConfig) -> Result<Self, WebchkError> {
        validate(&config)?;
        let fetcher = HttpFetcher::from_config(&config)?;
        Ok(Self::new(config, Arc::new(fetcher))?)
    }

    /// Starts the worker pool and the coordinator
    ///
    /// Must be called from within a tokio runtime. Results arrive on the returned
    /// [`Crawl`] in completion order; the stream closes once the crawl stops.
    pub fn start(self) -> Crawl {
        let config = self.config;
        for warning in warnings(&config) {
            tracing::warn!("{}", warning);
        }

        let started_at = Utc::now();
        let started = Instant::now();
        let cancel = CancellationToken::new();

        let base_url = trim_trailing_slash(&config.base_url).to_string();
        let (mut frontier, receiver) = frontier(config.buffer_size, cancel.clone());
        let limiter = Arc::new(RateLimiter::new(config.rate_per_sec, cancel.clone()));
        let search_terms: Arc<[String]> = Arc::from(config.search_terms.clone());

        let (events_tx, events_rx) = mpsc::channel(config.workers);
        let (results_tx, results_rx) = mpsc::channel(config.workers);

        for id in 0..config.workers {
            let worker = Worker::new(
                id,
                receiver.clone(),
                limiter.clone(),
                self.fetcher.clone(),
                search_terms.clone(),
                events_tx.clone(),
                cancel.clone(),
            );
            tokio::spawn(worker.run());
        }
        drop(events_tx);
        drop(receiver);

        let mut state = CrawlState::Running;
        // capacity is at least one, so the seed always fits
        if let Err(e) = frontier.try_push(FrontierEntry::seed(base_url.as_str())) {
            tracing::error!("Could not seed frontier with {}: {}", base_url, e);
            state.terminate(TerminationReason::Drained);
        }

        tracing::info!(
            "Starting crawl of {} with {} workers, buffer {}, {} req/s (one every {:?})",
            base_url,
            config.workers,
            config.buffer_size,
            config.rate_per_sec,
            limiter.period()
        );

        let coordinator = Coordinator {
            filter: DedupFilter::new(&base_url, &config.skip_suffixes),
            config,
            frontier,
            results: results_tx,
            cancel,
            state,
            results_forwarded: 0,
            started_at,
            started,
        };

        Crawl {
            results: results_rx,
            handle: tokio::spawn(coordinator.run(events_rx)),
        }
    }
}

/// A running crawl: the output stream plus the coordinator's final report
pub struct Crawl {
    results: mpsc::Receiver<PageResult>,
    handle: JoinHandle<CrawlReport>,
}

impl Crawl {
    /// Next result, or `None` once the crawl has stopped and every result was read
    pub async fn next(&mut self) -> Option<PageResult> {
        self.results.recv().await
    }

    /// Waits for the coordinator and returns its report
    ///
    /// Unread results are dropped; if the crawl is still running when this is
    /// called it stops with [`TerminationReason::Drained`] at its next result.
    pub async fn finish(self) -> Result<CrawlReport, WebchkError> {
        drop(self.results);
        Ok(self.handle.await?)
    }

    /// Reads every result, then returns them with the report
    pub async fn collect(mut self) -> Result<(Vec<PageResult>, CrawlReport), WebchkError> {
        let mut results = Vec::new();
        while let Some(result) = self.results.recv().await {
            results.push(result);
        }
        let report = self.handle.await?;
        Ok((results, report))
    }

    /// Splits the crawl into its output stream and report handle
    pub fn into_parts(self) -> (mpsc::Receiver<PageResult>, JoinHandle<CrawlReport>) {
        (self.results, self.handle)
    }
}

struct Coordinator {
    config: Arc<CrawlConfig>,
    filter: DedupFilter,
    frontier: Frontier,
    results: mpsc::Sender<PageResult>,
    cancel: CancellationToken,
    state: CrawlState,
    results_forwarded: usize,
    started_at: DateTime<Utc>,
    started: Instant,
}

impl Coordinator {
    async fn run(mut self, mut events: mpsc::Receiver<WorkerEvent>) -> CrawlReport {
        let idle_window = self.config.idle_timeout();
        let idle = tokio::time::sleep(idle_window);
        tokio::pin!(idle);

        let deadline = wait_until(self.config.deadline().map(|d| self.started + d));
        tokio::pin!(deadline);

        while self.state.is_running() {
            tokio::select! {
                biased;
                _ = &mut deadline => self.terminate(TerminationReason::Deadline),
                event = events.recv() => match event {
                    None => self.terminate(TerminationReason::Drained),
                    Some(WorkerEvent::Links(links)) => {
                        idle.as_mut().reset(Instant::now() + idle_window);
                        self.admit_links(links);
                    }
                    Some(WorkerEvent::Result(result)) => {
                        idle.as_mut().reset(Instant::now() + idle_window);
                        if result.is_too_many_requests() {
                            tracing::warn!("Too many requests at {}", result.url);
                            self.terminate(TerminationReason::TooManyRequests);
                            continue;
                        }
                        tokio::select! {
                            biased;
                            _ = &mut deadline => self.terminate(TerminationReason::Deadline),
                            sent = self.results.send(result) => match sent {
                                Ok(()) => {
                                    self.results_forwarded += 1;
                                    idle.as_mut().reset(Instant::now() + idle_window);
                                }
                                Err(_) => self.terminate(TerminationReason::Drained),
                            },
                        }
                    }
                },
                _ = &mut idle => self.terminate(TerminationReason::Idle),
            }
        }

        self.finish()
    }

    /// Queues every accepted link; stops the crawl on the first one that does not fit
    fn admit_links(&mut self, links: Vec<FrontierEntry>) {
        for entry in links {
            if !self.filter.admit(&entry.url) {
                continue;
            }

            let entry = FrontierEntry::new(trim_trailing_slash(&entry.url), entry.referrer);
            match self.frontier.try_push(entry) {
                Ok(()) => {}
                Err(PushError::Full(entry)) => {
                    tracing::warn!(
                        "No space left on buffer (capacity {}) for {}",
                        self.frontier.capacity(),
                        entry.url
                    );
                    self.terminate(TerminationReason::BufferFull);
                    return;
                }
                Err(PushError::Closed(_)) => {
                    self.terminate(TerminationReason::Drained);
                    return;
                }
            }
        }
    }

    /// Records the reason (first one wins) and cancels workers and rate limiter
    fn terminate(&mut self, reason: TerminationReason) {
        if !self.state.terminate(reason) {
            return;
        }

        self.cancel.cancel();

        match reason {
            TerminationReason::Deadline => match self.config.deadline() {
                Some(deadline) => {
                    tracing::warn!("Deadline of {:?} exceeded, quitting", deadline)
                }
                None => tracing::warn!("Deadline exceeded, quitting"),
            },
            TerminationReason::BufferFull | TerminationReason::TooManyRequests => {
                tracing::warn!("Stopping crawl: {}", reason)
            }
            TerminationReason::Idle | TerminationReason::Drained => {
                tracing::info!("Crawl finished: {}", reason)
            }
        }
    }

    fn finish(self) -> CrawlReport {
        // Dropping the frontier and results sender closes both streams
        let reason = self.state.reason().unwrap_or(TerminationReason::Drained);
        let report = CrawlReport {
            reason,
            urls_enqueued: self.frontier.enqueued(),
            results_forwarded: self.results_forwarded,
            urls_seen: self.filter.visited_count(),
            started_at: self.started_at,
            elapsed: self.started.elapsed(),
        };

        tracing::debug!(
            "Crawl report: reason={}, enqueued={}, forwarded={}, elapsed={:?}",
            report.reason.as_str(),
            report.urls_enqueued,
            report.results_forwarded,
            report.elapsed
        );

        report
    }
}

/// Completes at `at`, or never when there is no deadline
async fn wait_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
