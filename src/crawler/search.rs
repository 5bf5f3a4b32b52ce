//! Line-oriented search of page bodies
//!
//! Matching is a naive, case-insensitive substring search over the raw body,
//! markup included.

use crate::state::SearchMatch;

/// Finds every line of `body` that contains one of `search_terms`
///
/// Produces at most one match per (line, term) pair, in line order; terms on the
/// same line keep the order they were configured in. An empty term list skips the
/// search entirely.
///
/// # Example
///
/// ```
/// use webchk::crawler::find_matches;
///
/// let matches = find_matches("there\nthere old man", &["there".to_string()]);
/// assert_eq!(matches.len(), 2);
/// assert_eq!(matches[1].line, 2);
/// ```
pub fn find_matches(body: &str, search_terms: &[String]) -> Vec<SearchMatch> {
    if search_terms.is_empty() {
        return Vec::new();
    }

    let lowered_terms: Vec<String> = search_terms.iter().map(|t| t.to_lowercase()).collect();
    let mut matches = Vec::new();

    for (index, line) in body.lines().enumerate() {
        let line = line.to_lowercase();
        for (term, lowered) in search_terms.iter().zip(&lowered_terms) {
            if line.contains(lowered.as_str()) {
                matches.push(SearchMatch::new(index + 1, term.clone()));
            }
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(t: &[&str]) -> Vec<String> {
        t.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_body_no_terms() {
        assert!(find_matches("", &[]).is_empty());
    }

    #[test]
    fn test_no_terms_skips_search() {
        assert!(find_matches("hi there", &[]).is_empty());
    }

    #[test]
    fn test_single_hit() {
        assert_eq!(find_matches("hi there", &terms(&["hi"])).len(), 1);
    }

    #[test]
    fn test_two_terms_same_line() {
        let matches = find_matches("hi there old man", &terms(&["hi", "old"]));
        assert_eq!(
            matches,
            vec![SearchMatch::new(1, "hi"), SearchMatch::new(1, "old")]
        );
    }

    #[test]
    fn test_one_hit_per_line_per_term() {
        assert_eq!(
            find_matches("there there old man", &terms(&["there"])).len(),
            1
        );
    }

    #[test]
    fn test_hits_on_separate_lines() {
        let matches = find_matches("there\nthere old man", &terms(&["there"]));
        assert_eq!(
            matches,
            vec![SearchMatch::new(1, "there"), SearchMatch::new(2, "there")]
        );
    }

    #[test]
    fn test_line_numbers_are_one_based() {
        let matches = find_matches(
            "there\nthere old man\nmatch string\n---",
            &terms(&["match string"]),
        );
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].to_string(), "line:   3 match: match string");
    }

    #[test]
    fn test_no_hit() {
        assert!(find_matches("there there old man", &terms(&["zero"])).is_empty());
    }

    #[test]
    fn test_case_insensitive_keeps_configured_term() {
        let matches = find_matches("<h1>Hello World</h1>", &terms(&["hello WORLD"]));
        assert_eq!(matches, vec![SearchMatch::new(1, "hello WORLD")]);
    }

    #[test]
    fn test_crlf_lines() {
        let matches = find_matches("a\r\nneedle\r\nb", &terms(&["needle"]));
        assert_eq!(matches, vec![SearchMatch::new(2, "needle")]);
    }
}
