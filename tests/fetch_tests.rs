//! SafeFetcher integration tests against a local mock HTTP server.
//!
//! The mock server binds loopback, which the SSRF guard rejects by design,
//! so these tests build the fetcher with `permit_private_targets`. Guard
//! behavior itself is covered by unit tests in the fetch module.

use aria::tools::fetch::extract_text;
use aria::types::AppError;
use aria::{PageFetcher, SafeFetcher};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);
const MAX_BYTES: usize = 1_500_000;

fn loopback_fetcher() -> SafeFetcher {
    SafeFetcher::new().unwrap().permit_private_targets()
}

#[tokio::test]
async fn test_fetch_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>hi</body></html>"))
        .mount(&server)
        .await;

    let fetcher = loopback_fetcher();
    let body = fetcher
        .fetch(&format!("{}/article", server.uri()), TIMEOUT, MAX_BYTES)
        .await
        .unwrap();

    assert_eq!(body, "<html><body>hi</body></html>");
}

#[tokio::test]
async fn test_fetch_rejects_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = loopback_fetcher();
    let err = fetcher
        .fetch(&server.uri(), TIMEOUT, MAX_BYTES)
        .await
        .unwrap_err();

    match err {
        AppError::Fetch(message) => assert!(message.contains("404"), "got: {}", message),
        other => panic!("expected fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_enforces_byte_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(4096)))
        .mount(&server)
        .await;

    let fetcher = loopback_fetcher();
    let err = fetcher
        .fetch(&server.uri(), TIMEOUT, 1024)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::SizeExceeded));
}

#[tokio::test]
async fn test_fetch_enforces_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("slow")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let fetcher = loopback_fetcher();
    let err = fetcher
        .fetch(&server.uri(), Duration::from_millis(100), MAX_BYTES)
        .await
        .unwrap_err();

    match err {
        AppError::Timeout(message) => {
            assert_eq!(message, "Fetch timed out after 100ms");
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_guard_blocks_loopback_before_any_request() {
    // No server listening: the guard must reject before connecting.
    let fetcher = SafeFetcher::new().unwrap();
    let err = fetcher
        .fetch("http://127.0.0.1:1/secret", TIMEOUT, MAX_BYTES)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BlockedUrl(_)));
}

#[test]
fn test_extract_text_skips_scripts_and_keeps_block_breaks() {
    let html = "<html><head><script>var x = 1;</script><style>p{}</style></head>\
                <body><h1>Title</h1><p>First para.</p><p>Second para.</p>\
                <noscript>enable js</noscript></body></html>";
    let text = extract_text(html);

    assert!(text.contains("Title"));
    assert!(text.contains("First para."));
    assert!(text.contains("Second para."));
    assert!(!text.contains("var x"));
    assert!(!text.contains("enable js"));
    assert!(!text.contains("p{}"));
}
