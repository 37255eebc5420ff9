//! Mock implementations for testing.
//!
//! Scripted LLM, search, and fetcher doubles so the pipeline can be
//! exercised end to end without network access. Delays use tokio's timer so
//! tests running under `start_paused` stay in virtual time.

use aria::types::{AppError, Result, SourceRef};
use aria::{LLMClient, PageFetcher, SearchClient};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

// ============= LLM =============

/// Mock LLM client with configurable responses.
///
/// Responses queued with [`push_response`] are consumed in order; once the
/// queue is empty the fallback response (if any) repeats forever.
///
/// [`push_response`]: MockLLMClient::push_response
pub struct MockLLMClient {
    scripted: Mutex<VecDeque<String>>,
    fallback: Option<String>,
    should_fail: bool,
    delay: Option<Duration>,
}

impl MockLLMClient {
    /// Client returning the same response for every call.
    pub fn new(response: &str) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            fallback: Some(response.to_string()),
            should_fail: false,
            delay: None,
        }
    }

    /// Client returning the given responses in order, then failing.
    pub fn with_responses(responses: Vec<&str>) -> Self {
        Self {
            scripted: Mutex::new(responses.into_iter().map(String::from).collect()),
            fallback: None,
            should_fail: false,
            delay: None,
        }
    }

    /// Client that always returns an error.
    pub fn failing() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            fallback: None,
            should_fail: true,
            delay: None,
        }
    }

    /// Queue one more scripted response.
    pub fn push_response(&self, response: &str) {
        self.scripted.lock().push_back(response.to_string());
    }

    /// Sleep this long before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            return Err(AppError::LLM("mock LLM failure".to_string()));
        }
        if let Some(next) = self.scripted.lock().pop_front() {
            return Ok(next);
        }
        self.fallback
            .clone()
            .ok_or_else(|| AppError::LLM("mock LLM response queue exhausted".to_string()))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

// ============= Search =============

/// Mock search client returning a fixed result list and recording queries.
pub struct MockSearchClient {
    results: Vec<SourceRef>,
    should_fail: bool,
    delay: Option<Duration>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl MockSearchClient {
    /// Client returning the given results (truncated to the caller's limit).
    pub fn new(results: Vec<SourceRef>) -> Self {
        Self {
            results,
            should_fail: false,
            delay: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Client returning no results.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Client that always returns an error.
    pub fn failing() -> Self {
        Self {
            results: Vec::new(),
            should_fail: true,
            delay: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Sleep this long before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queries seen so far, with the limit passed for each.
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl SearchClient for MockSearchClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SourceRef>> {
        self.queries.lock().push((query.to_string(), limit));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            return Err(AppError::Search("mock search failure".to_string()));
        }
        Ok(self.results.iter().take(limit).cloned().collect())
    }
}

// ============= Fetch =============

/// Mock page fetcher serving canned HTML and recording fetched URLs.
pub struct MockFetcher {
    default_body: Option<String>,
    pages: HashMap<String, String>,
    failures: HashSet<String>,
    fetched: Mutex<Vec<String>>,
}

impl MockFetcher {
    /// Fetcher returning `body` for every URL.
    pub fn returning(body: &str) -> Self {
        Self {
            default_body: Some(body.to_string()),
            pages: HashMap::new(),
            failures: HashSet::new(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// Fetcher that errors for every URL.
    pub fn failing() -> Self {
        Self {
            default_body: None,
            pages: HashMap::new(),
            failures: HashSet::new(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// Serve `body` for this specific URL.
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    /// Error for this specific URL.
    pub fn failing_for(mut self, url: &str) -> Self {
        self.failures.insert(url.to_string());
        self
    }

    /// URLs fetched so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration, _max_bytes: usize) -> Result<String> {
        self.fetched.lock().push(url.to_string());
        if self.failures.contains(url) {
            return Err(AppError::Fetch("mock fetch failure".to_string()));
        }
        if let Some(body) = self.pages.get(url) {
            return Ok(body.clone());
        }
        self.default_body
            .clone()
            .ok_or_else(|| AppError::Fetch("mock fetch failure".to_string()))
    }
}
