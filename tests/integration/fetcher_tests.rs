//! Retry, redirect and timeout behavior of the fetcher

use blog_audit::config::FetcherConfig;
use blog_audit::pipeline::{FetchCause, Fetcher};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(max_attempts: u32, retry_delay_ms: u64) -> Fetcher {
    Fetcher::new(&FetcherConfig {
        timeout_secs: 1,
        connect_timeout_secs: 1,
        max_attempts,
        retry_delay_ms,
        ..FetcherConfig::default()
    })
    .expect("Failed to build fetcher")
}

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/post/hello"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>hello</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = fetcher(3, 0)
        .fetch(&format!("{}/post/hello", mock_server.uri()))
        .await
        .expect("Fetch should succeed");

    assert_eq!(page.status_code, 200);
    assert_eq!(page.body, "<html>hello</html>");
}

#[tokio::test]
async fn test_server_error_retried_until_attempts_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let started = Instant::now();
    let err = fetcher(3, 1000)
        .fetch(&format!("{}/flaky", mock_server.uri()))
        .await
        .expect_err("Fetch should fail");

    // Two pauses separate three attempts
    assert!(started.elapsed() >= Duration::from_millis(2000));
    assert_eq!(err.attempts, 3);
    assert_eq!(
        err.cause,
        FetchCause::Status {
            code: 500,
            body: "boom".to_string()
        }
    );
}

#[tokio::test]
async fn test_recovers_after_transient_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = fetcher(3, 0)
        .fetch(&format!("{}/recovering", mock_server.uri()))
        .await
        .expect("Second attempt should succeed");

    assert_eq!(page.body, "ok");
}

#[tokio::test]
async fn test_single_attempt_override() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = fetcher(3, 0)
        .fetch_with_attempts(&format!("{}/missing", mock_server.uri()), 1)
        .await
        .expect_err("Fetch should fail");

    assert_eq!(err.attempts, 1);
    assert_eq!(err.cause.status_code(), Some(404));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Reserve a port, then release it so nothing listens there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local addr").port();
    drop(listener);

    let started = Instant::now();
    let err = fetcher(3, 1000)
        .fetch(&format!("http://127.0.0.1:{}/post/gone", port))
        .await
        .expect_err("Fetch should fail");

    // Two pauses separate three attempts
    assert!(started.elapsed() >= Duration::from_millis(2000));
    assert_eq!(err.attempts, 3);
    assert!(matches!(err.cause, FetchCause::Transport(_)));
}

#[tokio::test]
async fn test_redirect_followed_and_final_url_reported() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/post/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/post/new", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/post/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved here"))
        .mount(&mock_server)
        .await;

    let page = fetcher(1, 0)
        .fetch(&format!("{}/post/old", base_url))
        .await
        .expect("Redirect should be followed");

    assert_eq!(page.final_url, format!("{}/post/new", base_url));
    assert_eq!(page.body, "moved here");
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let err = fetcher(1, 0)
        .fetch(&format!("{}/slow", mock_server.uri()))
        .await
        .expect_err("Fetch should time out");

    assert_eq!(err.cause, FetchCause::Timeout);
}

#[tokio::test]
async fn test_unparseable_url_fails_without_request() {
    let err = fetcher(3, 0)
        .fetch("1http://example.com/post/a")
        .await
        .expect_err("Fetch should fail");

    assert_eq!(err.attempts, 0);
    assert!(matches!(err.cause, FetchCause::Transport(_)));
}
