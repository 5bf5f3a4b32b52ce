use url::Url;

/// Strips a single trailing slash from a URL string
///
/// # Examples
///
/// ```
/// use webchk::url::trim_trailing_slash;
///
/// assert_eq!(trim_trailing_slash("https://example.com/"), "https://example.com");
/// assert_eq!(trim_trailing_slash("https://example.com/a//"), "https://example.com/a/");
/// assert_eq!(trim_trailing_slash("https://example.com/a"), "https://example.com/a");
/// ```
pub fn trim_trailing_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

/// Reduces a resolved link to the form the crawler compares and fetches
///
/// The query string and fragment are dropped, then surrounding whitespace and a
/// single trailing slash are trimmed.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webchk::url::canonical_link;
///
/// let url = Url::parse("https://example.com/docs/?page=2#top").unwrap();
/// assert_eq!(canonical_link(url), "https://example.com/docs");
/// ```
pub fn canonical_link(mut url: Url) -> String {
    url.set_query(None);
    url.set_fragment(None);
    trim_trailing_slash(url.as_str()).trim().to_string()
}
