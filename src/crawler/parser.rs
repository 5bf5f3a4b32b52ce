//! HTML parser for extracting links
//!
//! Every `<a href>` target is resolved against the page's URL and reduced to its
//! canonical form (no query, no fragment, no trailing slash). The result is sorted
//! and free of duplicates.

use crate::state::FetchError;
use crate::url::canonical_link;
use scraper::{Html, Selector};
use url::Url;

/// Extracts all followable links from an HTML page
///
/// # Arguments
///
/// * `html` - The raw HTML content
/// * `base_url` - URL the page was served from, for resolving relative links
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Absolute, canonical links, sorted and unique
/// * `Err(FetchError::Parse)` - The link selector could not be built
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document, relative or absolute
///
/// **Exclude:**
/// - `<a>` tags without an `href`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
///
/// # Example
///
/// ```
/// use webchk::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="two">2</a><a href="../one?x=1">1</a></body></html>"#;
/// let base_url = Url::parse("https://e.com/q").unwrap();
/// let links = extract_links(html, &base_url).unwrap();
/// assert_eq!(links, vec!["https://e.com/one", "https://e.com/two"]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Result<Vec<String>, FetchError> {
    let document = Html::parse_document(html);

    let a_selector =
        Selector::parse("a[href]").map_err(|e| FetchError::Parse(format!("{:?}", e)))?;

    let mut links: Vec<String> = document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect();

    links.sort();
    links.dedup();

    Ok(links)
}

/// Resolves a link href to its canonical absolute form
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    Some(canonical_link(absolute_url))
}
