//! Per-page outcome types produced by fetch workers
use std::fmt;
use thiserror::Error;

/// HTTP status code for "Too Many Requests"
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Why a page produced no links or matches
///
/// These are carried inside a [`PageResult`]; none of them stops the crawl by
/// itself (a 429 status is acted on by the coordinator, not here).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Content-Type is not HTML; the page is skipped, not failed
    #[error("NonHTMLPageType")]
    NonHtmlPageType { content_type: String },

    /// The server answered with something other than 200
    #[error("StatusNotOk")]
    StatusNotOk(u16),

    /// The request did not complete within the fetch timeout
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or protocol failure
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be read
    #[error("file reading error: {0}")]
    Body(String),

    /// The page could not be parsed for links
    #[error("links error: {0}")]
    Parse(String),
}

impl FetchError {
    /// Returns true for a 429 response, which asks the whole crawl to back off
    pub fn is_too_many_requests(&self) -> bool {
        matches!(self, Self::StatusNotOk(STATUS_TOO_MANY_REQUESTS))
    }

    /// Returns true if the page was skipped rather than failed
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::NonHtmlPageType { .. })
    }
}

/// A search term found on one line of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    /// 1-based line number
    pub line: usize,

    /// The search term, as configured
    pub term: String,
}

impl SearchMatch {
    pub fn new(line: usize, term: impl Into<String>) -> Self {
        Self {
            line,
            term: term.into(),
        }
    }
}

impl fmt::Display for SearchMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line: {:3} match: {}", self.line, self.term)
    }
}

/// The outcome of one fetch attempt
#[derive(Debug)]
pub struct PageResult {
    /// The URL that was fetched
    pub url: String,

    /// The page that linked here ("/" for the base URL)
    pub referrer: String,

    /// HTTP status code, 0 if no response was received
    pub status: u16,

    /// Search term matches in line order
    pub matches: Vec<SearchMatch>,

    /// Set when the page could not be searched
    pub error: Option<FetchError>,
}

impl PageResult {
    /// Creates an empty result for a URL about to be fetched
    pub fn new(url: impl Into<String>, referrer: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            referrer: referrer.into(),
            status: 0,
            matches: Vec::new(),
            error: None,
        }
    }

    /// Returns true if the server asked us to slow down
    pub fn is_too_many_requests(&self) -> bool {
        self.status == STATUS_TOO_MANY_REQUESTS
            || self
                .error
                .as_ref()
                .is_some_and(FetchError::is_too_many_requests)
    }

    /// Returns true if the page was fetched and searched without error
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
