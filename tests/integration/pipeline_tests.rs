//! End-to-end pipeline runs against a mock blog and a fake analysis client

use async_trait::async_trait;
use blog_audit::analysis::{AnalysisClient, AnalysisError, SeoAnalysis};
use blog_audit::config::{FetcherConfig, PipelineConfig};
use blog_audit::output::MarkdownSink;
use blog_audit::pipeline::{Fetcher, Pipeline, RunStatus};
use blog_audit::{AuditError, ErrorClass};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Analysis client that answers every request with the same review
struct FakeAnalyzer {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl FakeAnalyzer {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                fail: false,
            },
            calls,
        )
    }

    fn failing() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail: true,
        }
    }
}

#[async_trait]
impl AnalysisClient for FakeAnalyzer {
    async fn analyze(&self, title: &str, _body_text: &str) -> Result<SeoAnalysis, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AnalysisError::Api {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(SeoAnalysis {
            suggested_meta_description: format!("All about {}", title),
            seo_summary: "Clear structure, thin keyword coverage.".to_string(),
            keywords: vec!["rust".to_string(), "blogging".to_string()],
        })
    }
}

fn settings(error_budget: u32, request_delay_ms: u64) -> PipelineConfig {
    PipelineConfig {
        error_budget,
        request_delay_ms,
        ..PipelineConfig::default()
    }
}

fn build_pipeline(analyzer: FakeAnalyzer, settings: PipelineConfig) -> Pipeline {
    let fetcher = Fetcher::new(&FetcherConfig {
        max_attempts: 1,
        retry_delay_ms: 0,
        ..FetcherConfig::default()
    })
    .expect("Failed to build fetcher");
    Pipeline::new(fetcher, Box::new(analyzer), settings)
}

fn post_html(title: &str) -> String {
    format!(
        r#"<html><head><title>{0}</title>
        <meta name="description" content="Old description of {0}"></head>
        <body><nav>Home Blog</nav><article><p>Some words about {0}.</p></article></body></html>"#,
        title
    )
}

async fn mount_sitemap(mock_server: &MockServer, paths: &[&str]) {
    let locs: String = paths
        .iter()
        .map(|p| format!("<url><loc>{}{}</loc></url>", mock_server.uri(), p))
        .collect();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
            locs
        )))
        .mount(mock_server)
        .await;
}

async fn mount_page(
    mock_server: &MockServer,
    page_path: &str,
    status: u16,
    body: String,
    hits: u64,
) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(hits)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_end_to_end_markdown_report() {
    let mock_server = MockServer::start().await;
    mount_sitemap(&mock_server, &["/post/first", "/about", "/post/second"]).await;
    mount_page(&mock_server, "/post/first", 200, post_html("First"), 1).await;
    mount_page(&mock_server, "/post/second", 200, post_html("Second"), 1).await;
    mount_page(&mock_server, "/about", 200, post_html("About"), 0).await;

    let (analyzer, calls) = FakeAnalyzer::new();
    let pipeline = build_pipeline(analyzer, settings(3, 0));

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let report_path = dir.path().join("blog_analysis.md");
    let sink = MarkdownSink::new(&report_path);

    let outcome = pipeline
        .analyze_sitemap(
            &format!("{}/sitemap.xml", mock_server.uri()),
            &sink,
            Some("cafebabe".to_string()),
        )
        .await
        .expect("Run should succeed");

    assert_eq!(outcome.status, RunStatus::Completed);
    assert_eq!(outcome.analyzed_count, 2);
    assert_eq!(outcome.candidate_count, 2);
    assert_eq!(outcome.report_path, report_path);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let markdown = std::fs::read_to_string(&report_path).expect("Report should exist");
    assert!(markdown.contains("- **Config Hash**: cafebabe"));
    assert!(markdown.contains(&format!(
        "| First | {}/post/first | first | Old description of First | All about First |",
        mock_server.uri()
    )));
    assert!(markdown.contains("| rust, blogging | 4 |"));
    assert!(!markdown.contains("/about"));

    let first = markdown.find("/post/first").expect("First row missing");
    let second = markdown.find("/post/second").expect("Second row missing");
    assert!(first < second);
}

#[tokio::test]
async fn test_error_budget_stops_run() {
    let mock_server = MockServer::start().await;
    mount_sitemap(
        &mock_server,
        &["/post/ok", "/post/a", "/post/b", "/post/c", "/post/never"],
    )
    .await;
    mount_page(&mock_server, "/post/ok", 200, post_html("Ok"), 1).await;
    for gone in ["/post/a", "/post/b", "/post/c"] {
        mount_page(&mock_server, gone, 404, String::new(), 1).await;
    }
    mount_page(&mock_server, "/post/never", 200, post_html("Never"), 0).await;

    let (analyzer, _) = FakeAnalyzer::new();
    let report = build_pipeline(analyzer, settings(3, 0))
        .run(&format!("{}/sitemap.xml", mock_server.uri()))
        .await
        .expect("Run should keep its one record");

    assert_eq!(report.status, RunStatus::StoppedEarly);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].slug, "ok");
    assert_eq!(report.state.failed, 3);
    assert_eq!(report.state.processed(), 4);
    assert_eq!(report.state.candidates, 5);
}

#[tokio::test]
async fn test_success_resets_error_budget() {
    let mock_server = MockServer::start().await;
    mount_sitemap(
        &mock_server,
        &["/post/a", "/post/b", "/post/ok", "/post/c", "/post/d"],
    )
    .await;
    for gone in ["/post/a", "/post/b", "/post/c", "/post/d"] {
        mount_page(&mock_server, gone, 500, String::new(), 1).await;
    }
    mount_page(&mock_server, "/post/ok", 200, post_html("Ok"), 1).await;

    let (analyzer, _) = FakeAnalyzer::new();
    let report = build_pipeline(analyzer, settings(3, 0))
        .run(&format!("{}/sitemap.xml", mock_server.uri()))
        .await
        .expect("Run should succeed");

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.state.failed, 4);
}

#[tokio::test]
async fn test_skipped_page_counts_against_budget() {
    let mock_server = MockServer::start().await;
    mount_sitemap(
        &mock_server,
        &["/post/ok", "/post/empty", "/post/a", "/post/b", "/post/never"],
    )
    .await;
    mount_page(&mock_server, "/post/ok", 200, post_html("Ok"), 1).await;
    mount_page(
        &mock_server,
        "/post/empty",
        200,
        "<html><head><title>Empty</title></head><body><script>var x = 1;</script></body></html>"
            .to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/post/a", 404, String::new(), 1).await;
    mount_page(&mock_server, "/post/b", 404, String::new(), 1).await;
    mount_page(&mock_server, "/post/never", 200, post_html("Never"), 0).await;

    let (analyzer, calls) = FakeAnalyzer::new();
    let report = build_pipeline(analyzer, settings(3, 0))
        .run(&format!("{}/sitemap.xml", mock_server.uri()))
        .await
        .expect("Run should keep its one record");

    assert_eq!(report.status, RunStatus::StoppedEarly);
    assert_eq!(report.state.skipped, 1);
    assert_eq!(report.state.failed, 2);
    // The empty page never reaches the analyzer
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_candidates_are_paced() {
    let mock_server = MockServer::start().await;
    mount_sitemap(&mock_server, &["/post/a", "/post/b", "/post/c"]).await;
    for page in ["/post/a", "/post/b", "/post/c"] {
        mount_page(&mock_server, page, 200, post_html("Paced"), 1).await;
    }

    let (analyzer, _) = FakeAnalyzer::new();
    let pipeline = build_pipeline(analyzer, settings(3, 300));

    let started = Instant::now();
    let report = pipeline
        .run(&format!("{}/sitemap.xml", mock_server.uri()))
        .await
        .expect("Run should succeed");

    assert_eq!(report.records.len(), 3);
    assert!(started.elapsed() >= Duration::from_millis(600));
}

#[tokio::test]
async fn test_all_analyses_failing_is_no_results() {
    let mock_server = MockServer::start().await;
    mount_sitemap(&mock_server, &["/post/a", "/post/b"]).await;
    mount_page(&mock_server, "/post/a", 200, post_html("A"), 1).await;
    mount_page(&mock_server, "/post/b", 200, post_html("B"), 1).await;

    let err = build_pipeline(FakeAnalyzer::failing(), settings(3, 0))
        .run(&format!("{}/sitemap.xml", mock_server.uri()))
        .await
        .expect_err("Run without records should fail");

    assert!(matches!(err, AuditError::NoResults { candidates: 2 }));
    assert_eq!(err.class(), ErrorClass::Internal);
}

#[tokio::test]
async fn test_sitemap_without_posts() {
    let mock_server = MockServer::start().await;
    mount_sitemap(&mock_server, &["/about", "/contact"]).await;

    let (analyzer, calls) = FakeAnalyzer::new();
    let err = build_pipeline(analyzer, settings(3, 0))
        .run(&format!("{}/sitemap.xml", mock_server.uri()))
        .await
        .expect_err("Run should fail");

    assert!(matches!(err, AuditError::EmptySitemap { .. }));
    assert_eq!(err.status_code(), 404);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_sitemap_url() {
    let (analyzer, _) = FakeAnalyzer::new();
    let err = build_pipeline(analyzer, settings(3, 0))
        .run("sitemap.xml")
        .await
        .expect_err("Run should fail");

    assert!(matches!(err, AuditError::InvalidInput(_)));
    assert_eq!(err.class(), ErrorClass::BadInput);
}
