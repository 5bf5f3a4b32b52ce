//! Configuration module for webchk
//!
//! A crawl is driven entirely by a [`CrawlConfig`] value. It can be built in code,
//! loaded from a TOML file, or assembled from command-line flags; either way it is
//! validated before a dispatcher is started.
//!
//! # Example
//!
//! ```no_run
//! use webchk::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("webchk.toml")).unwrap();
//! println!("Crawling {} with {} workers", config.base_url, config.workers);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    CrawlConfig, DEFAULT_BUFFER_SIZE, DEFAULT_DEADLINE_MS, DEFAULT_HTTP_TIMEOUT_MS,
    DEFAULT_HTTP_WORKERS, DEFAULT_IDLE_TIMEOUT_MS, DEFAULT_RATE_PER_SEC, DEFAULT_SKIP_SUFFIXES,
    DEFAULT_WORKERS, MAX_QUEUE_CAPACITY, MAX_RATE_PER_SEC, MAX_TIMEOUT_MS,
};

pub use parser::{compute_config_hash, load_config, parse_config, parse_config_with_hash};
pub use validation::{validate, warnings, ConfigWarning};
