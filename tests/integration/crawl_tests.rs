//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the fetch and dispatch cycle end-to-end over real HTTP.

use std::collections::HashSet;
use std::io::Write;
use webchk::config::{load_config, CrawlConfig};
use webchk::crawler::{build_http_client, crawl, fetch_page};
use webchk::output::Printer;
use webchk::state::{FetchError, TerminationReason};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the given mock server
fn create_test_config(base_url: &str, terms: &[&str]) -> CrawlConfig {
    CrawlConfig {
        search_terms: terms.iter().map(|t| t.to_string()).collect(),
        workers: 4,
        buffer_size: 50,
        rate_per_sec: 100,
        http_workers: 4,
        http_timeout_ms: 1000,
        idle_timeout_ms: 400,
        deadline_ms: 10_000,
        ..CrawlConfig::new(base_url)
    }
}

/// A 200 response served as HTML
///
/// The mime type has to go through `set_body_raw`: a separate content-type
/// header is replaced by the one `set_body_string` picks.
fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_page_links_and_matches() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        html(
            "<html><body>\n\
             <a href=\"/about/\">About</a>\n\
             <a href=\"contact?x=1#top\">Contact</a>\n\
             <a href=\"mailto:someone@example.com\">Mail</a>\n\
             <p>Hello World</p>\n\
             </body></html>",
        ),
    )
    .await;

    let config = create_test_config(&base_url, &["hello"]);
    let client = build_http_client(&config).expect("Failed to build client");

    let terms = vec!["hello".to_string()];
    let (result, links) = fetch_page(&client, &base_url, "/", &terms).await;

    assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
    assert_eq!(result.status, 200);
    assert_eq!(result.referrer, "/");
    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].line, 5);
    assert_eq!(result.matches[0].term, "hello");

    assert_eq!(
        links,
        vec![format!("{}/about", base_url), format!("{}/contact", base_url)]
    );
}

#[tokio::test]
async fn test_fetch_page_status_not_ok() {
    let server = MockServer::start().await;
    mount_page(&server, "/private", ResponseTemplate::new(403)).await;

    let config = create_test_config(&server.uri(), &["x"]);
    let client = build_http_client(&config).expect("Failed to build client");

    let url = format!("{}/private", server.uri());
    let (result, links) = fetch_page(&client, &url, "/referrer", &[]).await;

    assert_eq!(result.status, 403);
    assert_eq!(result.error, Some(FetchError::StatusNotOk(403)));
    assert!(links.is_empty());
}

#[tokio::test]
async fn test_fetch_page_non_html_is_skipped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/data",
        ResponseTemplate::new(200)
            .set_body_raw(r#"{"hello": "world"}"#.as_bytes().to_vec(), "application/json"),
    )
    .await;

    let config = create_test_config(&server.uri(), &["hello"]);
    let client = build_http_client(&config).expect("Failed to build client");

    let url = format!("{}/data", server.uri());
    let terms = vec!["hello".to_string()];
    let (result, links) = fetch_page(&client, &url, "/", &terms).await;

    assert!(matches!(
        result.error,
        Some(FetchError::NonHtmlPageType { ref content_type }) if content_type == "application/json"
    ));
    assert!(result.matches.is_empty());
    assert!(links.is_empty());
}

#[tokio::test]
async fn test_fetch_page_timeout() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/slow",
        html("<html></html>").set_delay(std::time::Duration::from_millis(500)),
    )
    .await;

    let config = CrawlConfig {
        http_timeout_ms: 50,
        ..create_test_config(&server.uri(), &["x"])
    };
    let client = build_http_client(&config).expect("Failed to build client");

    let url = format!("{}/slow", server.uri());
    let (result, _) = fetch_page(&client, &url, "/", &[]).await;

    assert_eq!(result.error, Some(FetchError::Timeout));
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        html(&format!(
            r#"<html><body>
            <a href="{0}/page1">Page 1</a>
            <a href="/page2/">Page 2</a>
            <a href="/logo.png">Logo</a>
            <a href="https://elsewhere.example.com/">Elsewhere</a>
            </body></html>"#,
            base_url
        )),
    )
    .await;
    mount_page(
        &server,
        "/page1",
        html(r#"<html><body><a href="/">Home</a><a href="/page2">Two</a></body></html>"#),
    )
    .await;
    mount_page(
        &server,
        "/page2",
        html("<html><body>\nNeedle in a haystack\n</body></html>"),
    )
    .await;

    let config = create_test_config(&base_url, &["needle"]);
    let (results, report) = crawl(config)
        .expect("Failed to start crawl")
        .collect()
        .await
        .expect("Crawl failed");

    assert_eq!(report.reason, TerminationReason::Idle);
    assert_eq!(results.len(), 3, "results: {:?}", results);
    assert_eq!(report.results_forwarded, 3);
    assert_eq!(report.urls_enqueued, 3);

    let urls: HashSet<&str> = results.iter().map(|r| r.url.as_str()).collect();
    let want: HashSet<String> = ["", "/page1", "/page2"]
        .iter()
        .map(|p| format!("{}{}", base_url, p))
        .collect();
    assert_eq!(urls, want.iter().map(String::as_str).collect());

    let page2 = results
        .iter()
        .find(|r| r.url.ends_with("/page2"))
        .expect("page2 missing");
    assert_eq!(page2.matches.len(), 1);
    assert_eq!(page2.matches[0].line, 2);
    assert_eq!(page2.referrer, base_url);

    // the seed page's only visit
    let requests = server.received_requests().await.expect("recording disabled");
    assert_eq!(requests.iter().filter(|r| r.url.path() == "/").count(), 1);
}

#[tokio::test]
async fn test_crawl_stops_on_too_many_requests() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        html(r#"<html><body><a href="/limited">Limited</a></body></html>"#),
    )
    .await;
    mount_page(&server, "/limited", ResponseTemplate::new(429)).await;

    let config = create_test_config(&base_url, &["x"]);
    let (results, report) = crawl(config)
        .expect("Failed to start crawl")
        .collect()
        .await
        .expect("Crawl failed");

    assert_eq!(report.reason, TerminationReason::TooManyRequests);
    assert!(report.reason.is_truncated());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, base_url);
}

#[tokio::test]
async fn test_crawl_stops_when_buffer_full() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", html(&format!("<html><body>{}</body></html>", links))).await;

    let config = CrawlConfig {
        buffer_size: 5,
        ..create_test_config(&base_url, &["x"])
    };
    let (results, report) = crawl(config)
        .expect("Failed to start crawl")
        .collect()
        .await
        .expect("Crawl failed");

    assert_eq!(report.reason, TerminationReason::BufferFull);
    assert!(results.len() <= report.urls_enqueued);
}

#[tokio::test]
async fn test_crawl_from_config_file_and_print() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        html("<html><body>\n<a href=\"/missing\">gone</a>\nwelcome home\n</body></html>"),
    )
    .await;
    mount_page(&server, "/missing", ResponseTemplate::new(404)).await;

    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    write!(
        file,
        r#"
base-url = "{}"
search-terms = ["welcome"]
workers = 2
rate-per-sec = 50
idle-timeout-ms = 400
http-timeout-ms = 1000
deadline-ms = 10000
"#,
        base_url
    )
    .expect("Failed to write config");

    let config = load_config(file.path()).expect("Failed to load config");
    assert_eq!(config.workers, 2);

    let mut crawl = crawl(config).expect("Failed to start crawl");
    let mut printer = Printer::new(Vec::new(), false);
    printer.header(&base_url).unwrap();
    while let Some(result) = crawl.next().await {
        printer.print(&result).unwrap();
    }
    let (out, stats) = printer.finish().unwrap();
    let report = crawl.finish().await.expect("Crawl failed");

    assert_eq!(report.reason, TerminationReason::Idle);
    assert_eq!(stats.pages, 2);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.pages_with_matches, 1);

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains(&format!("Commencing search of {}:", base_url)));
    assert!(out.contains("> line:   3 match: welcome"));
    assert!(out.contains(&format!("{}/missing\n- status 404 (from {})", base_url, base_url)));
    assert!(out.ends_with("processed 2 pages\n"));
}
