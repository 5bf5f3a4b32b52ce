//! webchk main entry point
//!
//! This is the command-line interface for searching a website for one or more terms.

use anyhow::Context;
use clap::Parser;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webchk::config::{parse_config_with_hash, CrawlConfig};
use webchk::crawler::crawl;
use webchk::output::Printer;

/// webchk: search all the pages of a website for one or more terms
///
/// Pages are fetched recursively from BASE_URL, staying under it. Matching is
/// case-insensitive and includes markup.
#[derive(Parser, Debug)]
#[command(name = "webchk")]
#[command(version)]
#[command(about = "Search all the pages of a website for one or more terms", long_about = None)]
struct Cli {
    /// Website to search, e.g. https://www.example.com
    #[arg(value_name = "BASE_URL")]
    base_url: String,

    /// Term to search for (repeat for more than one)
    #[arg(short, long = "search", value_name = "TERM", required = true)]
    search: Vec<String>,

    /// Increase logging verbosity and list every page (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress log output except errors
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,

    /// TOML file with crawl settings; flags override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of fetch workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Capacity of the pending-link buffer
    #[arg(short = 'z', long)]
    buffer_size: Option<usize>,

    /// Requests per second across all workers
    #[arg(short = 'q', long)]
    rate: Option<u32>,

    /// Idle HTTP connections kept per host
    #[arg(short = 'x', long)]
    http_workers: Option<usize>,

    /// Overall timeout in seconds (0 for none)
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Stop after this long without activity (milliseconds)
    #[arg(long, value_name = "MS")]
    idle_ms: Option<u64>,

    /// Timeout for a single page fetch (milliseconds)
    #[arg(long, value_name = "MS")]
    http_timeout_ms: Option<u64>,
}

impl Cli {
    /// Builds the crawl configuration: file values first, then flags
    fn crawl_config(&self) -> anyhow::Result<CrawlConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let (config, hash) = parse_config_with_hash(path)
                    .with_context(|| format!("loading config {}", path.display()))?;
                tracing::info!(
                    "Configuration loaded from {} (hash: {})",
                    path.display(),
                    hash
                );
                config
            }
            None => CrawlConfig::default(),
        };

        config.base_url = self.base_url.clone();
        config.search_terms = self.search.clone();

        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(buffer_size) = self.buffer_size {
            config.buffer_size = buffer_size;
        }
        if let Some(rate) = self.rate {
            config.rate_per_sec = rate;
        }
        if let Some(http_workers) = self.http_workers {
            config.http_workers = http_workers;
        }
        if let Some(timeout) = self.timeout {
            config.deadline_ms =
                i64::try_from(timeout.saturating_mul(1000)).unwrap_or(i64::MAX);
        }
        if let Some(idle_ms) = self.idle_ms {
            config.idle_timeout_ms = idle_ms;
        }
        if let Some(http_timeout_ms) = self.http_timeout_ms {
            config.http_timeout_ms = http_timeout_ms;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = cli.crawl_config()?;
    let base_url = config.base_url.clone();

    let mut crawl = crawl(config).context("starting crawl")?;

    let stdout = io::stdout();
    let mut printer = Printer::new(BufWriter::new(stdout.lock()), cli.verbose > 0);
    printer.header(&base_url)?;
    while let Some(result) = crawl.next().await {
        printer.print(&result)?;
    }
    let (_, stats) = printer.finish()?;

    let report = crawl.finish().await.context("waiting for crawl to finish")?;
    tracing::info!(
        "Stopped ({}) after {:.1}s: {} pages read, {} with matches, {} errors, {} queued",
        report.reason,
        report.elapsed.as_secs_f64(),
        stats.pages,
        stats.pages_with_matches,
        stats.errors,
        report.urls_enqueued
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("webchk=info,warn"),
            1 => EnvFilter::new("webchk=debug,info"),
            2 => EnvFilter::new("webchk=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
