//! Shared helpers for integration tests.

// Not every test binary uses every helper.
#![allow(dead_code)]

pub mod mocks;

use aria::SourceRef;
use tracing_subscriber::EnvFilter;

/// Initialize test logging once; honors `RUST_LOG`, captured per test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build `n` distinct search results with stable fake URLs.
pub fn sample_sources(n: usize) -> Vec<SourceRef> {
    (1..=n)
        .map(|i| SourceRef {
            title: format!("Result {}", i),
            url: format!("https://example.com/page-{}", i),
            snippet: format!("Snippet for result {}", i),
            publisher: "example.com".to_string(),
            published_at: "2024-03-01".to_string(),
        })
        .collect()
}
