use crate::url::normalize::trim_trailing_slash;
use std::collections::HashSet;

/// Scope and uniqueness gate for discovered links
///
/// The filter owns the set of URLs already admitted to the frontier. It is held by
/// the coordinator alone and never shared with workers, so it carries no lock.
#[derive(Debug, Clone)]
pub struct DedupFilter {
    base_url: String,
    skip_suffixes: Vec<String>,
    visited: HashSet<String>,
}

impl DedupFilter {
    /// Creates a filter scoped to `base_url`
    ///
    /// The base URL is recorded as visited up front so it is never queued twice.
    pub fn new(base_url: &str, skip_suffixes: &[String]) -> Self {
        let base_url = trim_trailing_slash(base_url).to_string();
        let mut visited = HashSet::new();
        visited.insert(base_url.clone());

        Self {
            base_url,
            skip_suffixes: skip_suffixes.to_vec(),
            visited,
        }
    }

    /// Decides whether a discovered URL should be queued
    ///
    /// Rejects URLs outside the base URL, URLs ending in an excluded suffix, and
    /// URLs admitted before. An accepted URL is recorded so it is rejected next time.
    ///
    /// # Examples
    ///
    /// ```
    /// use webchk::url::DedupFilter;
    ///
    /// let mut filter = DedupFilter::new("http://x.com", &[".png".to_string()]);
    /// assert!(filter.admit("http://x.com/ok/"));
    /// assert!(!filter.admit("http://x.com/ok"));
    /// assert!(!filter.admit("http://x.com/1.png"));
    /// assert!(!filter.admit("http://y.com/ok"));
    /// ```
    pub fn admit(&mut self, url: &str) -> bool {
        let url = trim_trailing_slash(url);

        if !url.contains(self.base_url.as_str()) {
            return false;
        }

        if self.visited.contains(url) {
            return false;
        }

        if self
            .skip_suffixes
            .iter()
            .any(|suffix| url.ends_with(suffix.as_str()))
        {
            return false;
        }

        self.visited.insert(url.to_string());
        true
    }

    /// The base URL every admitted link must fall under
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of distinct URLs recorded, the base URL included
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Returns true if the URL has already been recorded
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(trim_trailing_slash(url))
    }
}
