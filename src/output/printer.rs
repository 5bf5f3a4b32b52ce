//! Plain-text rendering of crawl results

use crate::output::stats::CrawlStats;
use crate::state::{FetchError, PageResult};
use std::io::{self, Write};

/// Writes results as they arrive and keeps a tally of them
///
/// Pages with matches, failed pages and errors are always shown; pages with
/// nothing to report are listed only in verbose mode. Non-HTML pages are
/// counted but never shown.
pub struct Printer<W: Write> {
    out: W,
    verbose: bool,
    stats: CrawlStats,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            out,
            verbose,
            stats: CrawlStats::new(),
        }
    }

    /// Writes the banner shown before the first result
    pub fn header(&mut self, base_url: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Commencing search of {}:", base_url)
    }

    /// Writes one result
    pub fn print(&mut self, result: &PageResult) -> io::Result<()> {
        self.stats.record(result);

        match &result.error {
            Some(e) if e.is_skip() => Ok(()),
            Some(FetchError::StatusNotOk(status)) => {
                writeln!(self.out, "{}", result.url)?;
                writeln!(
                    self.out,
                    "- status {} (from {})",
                    status, result.referrer
                )
            }
            Some(e) => writeln!(self.out, "{} : error {}", result.url, e),
            None if !result.matches.is_empty() => {
                writeln!(self.out, "{}", result.url)?;
                for m in &result.matches {
                    writeln!(self.out, "> {}", m)?;
                }
                Ok(())
            }
            None if self.verbose => writeln!(self.out, "{}", result.url),
            None => Ok(()),
        }
    }

    /// Writes the closing page count and returns the tally
    pub fn finish(mut self) -> io::Result<(W, CrawlStats)> {
        writeln!(self.out, "processed {} pages", self.stats.pages)?;
        self.out.flush()?;
        Ok((self.out, self.stats))
    }
}
