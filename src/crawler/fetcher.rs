//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured timeout and connection pool
//! - GET requests to fetch page content
//! - Error classification into [`FetchError`]
//! - Link extraction and term search on HTML pages
//!
//! The dispatcher only sees the [`PageFetcher`] trait, so tests can swap in a
//! fetcher that never touches the network.

use crate::config::CrawlConfig;
use crate::crawler::parser::extract_links;
use crate::crawler::search::find_matches;
use crate::state::{FetchError, PageResult};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use std::time::Duration;

/// Fetches one page and reports what it found
///
/// Implementations must bound their own run time and must always return a
/// result; failures are carried in [`PageResult::error`]. Discovered links are
/// absolute, canonical, sorted and unique, and empty on every error path.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        referrer: &str,
        search_terms: &[String],
    ) -> (PageResult, Vec<String>);
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use webchk::config::CrawlConfig;
/// use webchk::crawler::build_http_client;
///
/// let config = CrawlConfig::new("https://example.com");
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &CrawlConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.http_timeout())
        .connect_timeout(config.http_timeout())
        .pool_max_idle_per_host(config.http_workers)
        .pool_idle_timeout(Duration::from_secs(30))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with a client configured from `config`
    pub fn from_config(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        referrer: &str,
        search_terms: &[String],
    ) -> (PageResult, Vec<String>) {
        fetch_page(&self.client, url, referrer, search_terms).await
    }
}

/// Fetches a URL, extracts its links and searches its body
///
/// # Arguments
///
/// * `client` - HTTP client, normally from [`build_http_client`]
/// * `url` - Page to fetch
/// * `referrer` - Page the URL was found on, copied into the result
/// * `search_terms` - Terms to look for, case-insensitively
///
/// # Returns
///
/// The page result and the links found on it. Failures never escape: they are
/// recorded in [`PageResult::error`] and the link list is empty.
///
/// # Request Flow
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | Transport failure | `Timeout` or `Network`, status 0 |
/// | Status other than 200 | `StatusNotOk`, status kept |
/// | Content-Type without `text/html` | `NonHtmlPageType` |
/// | Body read failure | `Body` |
/// | Link parsing failure | `Parse` |
/// | Otherwise | links and matches |
pub async fn fetch_page(
    client: &Client,
    url: &str,
    referrer: &str,
    search_terms: &[String],
) -> (PageResult, Vec<String>) {
    let mut result = PageResult::new(url, referrer);

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Request to {} failed: {}", url, e);
            result.error = Some(classify_transport_error(&e));
            return (result, Vec::new());
        }
    };

    let status = response.status();
    result.status = status.as_u16();

    if status != StatusCode::OK {
        result.error = Some(FetchError::StatusNotOk(status.as_u16()));
        return (result, Vec::new());
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.contains("text/html") {
        result.error = Some(FetchError::NonHtmlPageType { content_type });
        return (result, Vec::new());
    }

    // links resolve against where we ended up, not where we started
    let final_url = response.url().clone();

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            result.error = Some(if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e.to_string())
            });
            return (result, Vec::new());
        }
    };

    let links = match extract_links(&body, &final_url) {
        Ok(links) => links,
        Err(e) => {
            result.error = Some(e);
            return (result, Vec::new());
        }
    };

    result.matches = find_matches(&body, search_terms);
    tracing::trace!(
        "Fetched {}: {} links, {} matches",
        url,
        links.len(),
        result.matches.len()
    );

    (result, links)
}

/// Maps a request failure onto the per-page error taxonomy
fn classify_transport_error(e: &reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}
