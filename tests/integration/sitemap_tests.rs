//! Sitemap resolution against a mock host

use blog_audit::config::FetcherConfig;
use blog_audit::pipeline::{Fetcher, SitemapResolver};
use blog_audit::{AuditError, ErrorClass};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> Fetcher {
    Fetcher::new(&FetcherConfig {
        max_attempts: 1,
        retry_delay_ms: 0,
        ..FetcherConfig::default()
    })
    .expect("Failed to build fetcher")
}

async fn serve_sitemap(mock_server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/xml"),
        )
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_resolve_filters_and_dedupes() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    serve_sitemap(
        &mock_server,
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{0}/post/first</loc></url>
  <url><loc>{0}/about</loc></url>
  <url><loc>{0}/post/second</loc></url>
  <url><loc>{0}/post/first</loc></url>
</urlset>"#,
            base_url
        ),
    )
    .await;

    let fetcher = fetcher();
    let candidates = SitemapResolver::new(&fetcher, "/post/")
        .resolve(&format!("{}/sitemap.xml", base_url))
        .await
        .expect("Sitemap should resolve");

    let urls: Vec<&str> = candidates.iter().map(|c| c.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/post/first", base_url),
            format!("{}/post/second", base_url)
        ]
    );
}

#[tokio::test]
async fn test_plain_text_sitemap_fallback() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    serve_sitemap(
        &mock_server,
        format!("{0}/post/one\n{0}/tags\n{0}/post/two\n", base_url),
    )
    .await;

    let fetcher = fetcher();
    let candidates = SitemapResolver::new(&fetcher, "/post/")
        .resolve(&format!("{}/sitemap.xml", base_url))
        .await
        .expect("Plain-text sitemap should resolve");

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[1].slug("/post/"), "two");
}

#[tokio::test]
async fn test_sitemap_without_posts_is_empty_error() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    serve_sitemap(
        &mock_server,
        format!(
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{}/about</loc></url>
</urlset>"#,
            base_url
        ),
    )
    .await;

    let fetcher = fetcher();
    let err = SitemapResolver::new(&fetcher, "/post/")
        .resolve(&format!("{}/sitemap.xml", base_url))
        .await
        .expect_err("Sitemap without posts should fail");

    assert!(matches!(err, AuditError::EmptySitemap { .. }));
    assert_eq!(err.class(), ErrorClass::NotFound);
}

#[tokio::test]
async fn test_missing_sitemap_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher();
    let err = SitemapResolver::new(&fetcher, "/post/")
        .resolve(&format!("{}/sitemap.xml", mock_server.uri()))
        .await
        .expect_err("Missing sitemap should fail");

    assert!(matches!(err, AuditError::Fetch(_)));
    assert_eq!(err.status_code(), 404);
}
