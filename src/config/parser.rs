use crate::config::types::CrawlConfig;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Keys left out of the file keep their defaults. A missing `base-url` is a
/// validation error, so callers that take the base URL from elsewhere (the
/// command line) should use [`parse_config`] and validate afterwards.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(CrawlConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to read, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use webchk::config::load_config;
///
/// let config = load_config(Path::new("webchk.toml")).unwrap();
/// println!("Workers: {}", config.workers);
/// ```
pub fn load_config(path: &Path) -> Result<CrawlConfig, ConfigError> {
    let config = parse_config(path)?;
    validate(&config)?;
    Ok(config)
}

/// Reads and parses a configuration file without validating it
pub fn parse_config(path: &Path) -> Result<CrawlConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: CrawlConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at start-up so two runs can be told apart when their settings differ.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Parses a configuration and returns both the config and its hash
pub fn parse_config_with_hash(path: &Path) -> Result<(CrawlConfig, String), ConfigError> {
    let config = parse_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
