//! Tally of the pages a crawl produced

use crate::state::PageResult;

/// Counts kept while results are read from the output stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Every result read, skipped and failed pages included
    pub pages: usize,

    /// Pages with at least one match
    pub pages_with_matches: usize,

    /// Matches over all pages
    pub total_matches: usize,

    /// Pages that failed with a status or transport error
    pub errors: usize,

    /// Pages skipped because they were not HTML
    pub skipped: usize,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one result to the tally
    pub fn record(&mut self, result: &PageResult) {
        self.pages += 1;

        match &result.error {
            Some(e) if e.is_skip() => self.skipped += 1,
            Some(_) => self.errors += 1,
            None if !result.matches.is_empty() => {
                self.pages_with_matches += 1;
                self.total_matches += result.matches.len();
            }
            None => {}
        }
    }
}
