use crate::config::types::{CrawlConfig, MAX_QUEUE_CAPACITY, MAX_RATE_PER_SEC, MAX_TIMEOUT_MS};
use crate::ConfigError;
use std::fmt;
use url::Url;

/// A configuration that will run, but probably not the way it was meant to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The idle window is at least as long as the deadline, so the deadline can never fire
    IdleNotBelowDeadline,

    /// The deadline is shorter than a single fetch may take
    DeadlineBelowHttpTimeout,

    /// A slow page may leave the crawl quiet long enough to be taken as finished
    IdleBelowHttpTimeout,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::IdleNotBelowDeadline => {
                "idle timeout is not shorter than the deadline; the deadline will never be reached"
            }
            Self::DeadlineBelowHttpTimeout => {
                "deadline is shorter than the http timeout; the crawl may stop before any page is fetched"
            }
            Self::IdleBelowHttpTimeout => {
                "idle timeout is shorter than the http timeout; a slow page may end the crawl early"
            }
        };
        f.write_str(message)
    }
}

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_base_url(&config.base_url)?;
    validate_limits(config)?;
    Ok(())
}

/// Returns the soft problems with a configuration that already passed validation
pub fn warnings(config: &CrawlConfig) -> Vec<ConfigWarning> {
    let mut found = Vec::new();

    if let Some(deadline) = config.deadline() {
        if config.idle_timeout() >= deadline {
            found.push(ConfigWarning::IdleNotBelowDeadline);
        }
        if deadline < config.http_timeout() {
            found.push(ConfigWarning::DeadlineBelowHttpTimeout);
        }
    }

    if config.idle_timeout() < config.http_timeout() {
        found.push(ConfigWarning::IdleBelowHttpTimeout);
    }

    found
}

/// Validates that the base URL is an absolute http(s) URL
fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    if base_url.is_empty() {
        return Err(ConfigError::Validation(
            "base_url cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            base_url
        )));
    }

    Ok(())
}

/// Validates the numeric limits of the dispatcher
///
/// Upper bounds keep every value within what the runtime can build: channel
/// capacities, a non-zero rate limiter period, and timer arithmetic.
fn validate_limits(config: &CrawlConfig) -> Result<(), ConfigError> {
    if !(1..=MAX_QUEUE_CAPACITY).contains(&config.workers) {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_QUEUE_CAPACITY, config.workers
        )));
    }

    if !(1..=MAX_QUEUE_CAPACITY).contains(&config.buffer_size) {
        return Err(ConfigError::Validation(format!(
            "buffer_size must be between 1 and {}, got {}",
            MAX_QUEUE_CAPACITY, config.buffer_size
        )));
    }

    if !(1..=MAX_RATE_PER_SEC).contains(&config.rate_per_sec) {
        return Err(ConfigError::Validation(format!(
            "rate_per_sec must be between 1 and {}, got {}",
            MAX_RATE_PER_SEC, config.rate_per_sec
        )));
    }

    if config.http_workers < 1 {
        return Err(ConfigError::Validation(format!(
            "http_workers must be >= 1, got {}",
            config.http_workers
        )));
    }

    if config.http_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "http_timeout_ms must be > 0".to_string(),
        ));
    }

    if config.idle_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "idle_timeout_ms must be > 0".to_string(),
        ));
    }

    for (name, ms) in [
        ("http_timeout_ms", config.http_timeout_ms),
        ("idle_timeout_ms", config.idle_timeout_ms),
        ("deadline_ms", u64::try_from(config.deadline_ms).unwrap_or(0)),
    ] {
        if ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Validation(format!(
                "{} must be at most {}, got {}",
                name, MAX_TIMEOUT_MS, ms
            )));
        }
    }

    Ok(())
}
