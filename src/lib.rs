//! webchk: search every page of a website for one or more terms
//!
//! This crate implements a bounded, rate-limited recursive crawler. Pages reachable
//! from a base URL are fetched by a pool of workers, searched line by line for the
//! configured terms, and streamed back to the caller until the crawl goes idle, hits
//! its deadline, runs out of frontier space, or the server asks us to back off.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for webchk operations
#[derive(Debug, Error)]
pub enum WebchkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Coordinator task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for webchk operations
pub type Result<T> = std::result::Result<T, WebchkError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{Crawl, CrawlReport, Dispatcher, HttpFetcher, PageFetcher};
pub use state::{FetchError, PageResult, SearchMatch, TerminationReason};
