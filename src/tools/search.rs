//! Web search client for the Serper API.
//!
//! A single external call per run: the orchestrator does not retry a failed
//! search, it fails the whole run. Results are normalized into
//! [`SourceRef`] entries; downstream callers drop entries without a url.

use crate::types::{AppError, Result, SourceRef};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Default Serper search endpoint.
pub const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";

/// Abstraction over web search so the orchestrator can be tested without the
/// network.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Run `query`, returning up to `limit` normalized candidate sources.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SourceRef>>;
}

/// Search client backed by the Serper API.
pub struct SerperClient {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl SerperClient {
    /// Create a client against the default Serper endpoint.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_endpoint(api_key, SERPER_ENDPOINT.to_string())
    }

    /// Create a client against a custom endpoint (used by tests).
    pub fn with_endpoint(api_key: Option<String>, endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperOrganic>,
}

#[derive(Debug, Deserialize)]
struct SerperOrganic {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
    source: Option<String>,
    date: Option<String>,
}

#[async_trait]
impl SearchClient for SerperClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SourceRef>> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                AppError::Configuration("Missing SERPER_API_KEY for web search".to_string())
            })?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", api_key)
            .json(&json!({ "q": query, "num": limit }))
            .send()
            .await
            .map_err(|e| AppError::Search(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            return Err(AppError::Search(format!(
                "status {}: {}",
                status.as_u16(),
                preview
            )));
        }

        let payload: SerperResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("malformed payload: {}", e)))?;

        tracing::debug!(query, count = payload.organic.len(), "search completed");

        Ok(payload
            .organic
            .into_iter()
            .map(|item| SourceRef {
                title: item.title.unwrap_or_default(),
                url: item.link.unwrap_or_default(),
                snippet: item.snippet.unwrap_or_default(),
                publisher: item.source.unwrap_or_default(),
                published_at: item.date.unwrap_or_default(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_is_configuration_error() {
        let client = SerperClient::new(None);
        let result = client.search("rust async", 5).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));

        let client = SerperClient::new(Some(String::new()));
        let result = client.search("rust async", 5).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
