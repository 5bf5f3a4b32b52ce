//! Fetch workers
//!
//! Each worker loops: take an entry from the frontier, wait for a rate limiter
//! token, fetch, then report the result and the links it found to the
//! coordinator. Cancellation is checked before every report, because a fetch may
//! have outlived the crawl.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::frontier::{FrontierEntry, FrontierReceiver};
use crate::crawler::rate_limiter::RateLimiter;
use crate::state::PageResult;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Message from a worker to the coordinator
#[derive(Debug)]
pub enum WorkerEvent {
    /// One fetch attempt finished
    Result(PageResult),

    /// Links found on the page just reported, tagged with it as referrer
    Links(Vec<FrontierEntry>),
}

/// One member of the fetch pool
pub struct Worker {
    id: usize,
    frontier: FrontierReceiver,
    limiter: Arc<RateLimiter>,
    fetcher: Arc<dyn PageFetcher>,
    search_terms: Arc<[String]>,
    events: mpsc::Sender<WorkerEvent>,
    cancel: CancellationToken,
}

impl Worker {
    pub fn new(
        id: usize,
        frontier: FrontierReceiver,
        limiter: Arc<RateLimiter>,
        fetcher: Arc<dyn PageFetcher>,
        search_terms: Arc<[String]>,
        events: mpsc::Sender<WorkerEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            frontier,
            limiter,
            fetcher,
            search_terms,
            events,
            cancel,
        }
    }

    /// Runs until the crawl is cancelled or the frontier is closed and empty
    pub async fn run(self) {
        tracing::trace!("Worker {} started", self.id);

        while let Some(entry) = self.frontier.next().await {
            if self.limiter.acquire().await.is_err() {
                break;
            }

            tracing::debug!("Worker {} fetching {}", self.id, entry.url);
            let (result, links) = self
                .fetcher
                .fetch(&entry.url, &entry.referrer, &self.search_terms)
                .await;

            let referrer = result.url.clone();
            if !self.emit(WorkerEvent::Result(result)).await {
                break;
            }

            let links = links
                .into_iter()
                .map(|url| FrontierEntry::new(url, referrer.as_str()))
                .collect();
            if !self.emit(WorkerEvent::Links(links)).await {
                break;
            }
        }

        tracing::trace!("Worker {} stopped", self.id);
    }

    /// Sends an event unless the crawl is over; returns false if it was not sent
    async fn emit(&self, event: WorkerEvent) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.events.send(event) => sent.is_ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::frontier::frontier;
    use async_trait::async_trait;
    use std::time::Duration;

    struct EchoFetcher {
        delay: Duration,
        links: Vec<String>,
    }

    #[async_trait]
    impl PageFetcher for EchoFetcher {
        async fn fetch(
            &self,
            url: &str,
            referrer: &str,
            _search_terms: &[String],
        ) -> (PageResult, Vec<String>) {
            tokio::time::sleep(self.delay).await;
            let mut result = PageResult::new(url, referrer);
            result.status = 200;
            (result, self.links.clone())
        }
    }

    fn spawn_worker(
        fetcher: EchoFetcher,
        cancel: &CancellationToken,
    ) -> (
        crate::crawler::frontier::Frontier,
        mpsc::Receiver<WorkerEvent>,
        tokio::task::JoinHandle<()>,
    ) {
        let (frontier, receiver) = frontier(4, cancel.clone());
        let limiter = Arc::new(RateLimiter::new(1000, cancel.clone()));
        let (tx, rx) = mpsc::channel(4);
        let worker = Worker::new(
            0,
            receiver,
            limiter,
            Arc::new(fetcher),
            Arc::from(Vec::<String>::new()),
            tx,
            cancel.clone(),
        );
        (frontier, rx, tokio::spawn(worker.run()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_then_links_with_referrer() {
        let cancel = CancellationToken::new();
        let fetcher = EchoFetcher {
            delay: Duration::from_millis(5),
            links: vec!["https://e.com/a".to_string()],
        };
        let (mut frontier, mut events, _handle) = spawn_worker(fetcher, &cancel);

        frontier.try_push(FrontierEntry::seed("https://e.com")).unwrap();

        match events.recv().await {
            Some(WorkerEvent::Result(result)) => {
                assert_eq!(result.url, "https://e.com");
                assert_eq!(result.referrer, "/");
            }
            other => panic!("expected result, got {:?}", other),
        }
        match events.recv().await {
            Some(WorkerEvent::Links(links)) => {
                assert_eq!(links, vec![FrontierEntry::new("https://e.com/a", "https://e.com")]);
            }
            other => panic!("expected links, got {:?}", other),
        }
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_discarded_when_cancelled_mid_fetch() {
        let cancel = CancellationToken::new();
        let fetcher = EchoFetcher {
            delay: Duration::from_millis(50),
            links: vec![],
        };
        let (mut frontier, mut events, handle) = spawn_worker(fetcher, &cancel);

        frontier.try_push(FrontierEntry::seed("https://e.com")).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();

        handle.await.unwrap();
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_worker_exits_when_frontier_closed() {
        let cancel = CancellationToken::new();
        let fetcher = EchoFetcher {
            delay: Duration::ZERO,
            links: vec![],
        };
        let (frontier, _events, handle) = spawn_worker(fetcher, &cancel);
        drop(frontier);
        handle.await.unwrap();
    }
}
