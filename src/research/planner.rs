//! Search query derivation.
//!
//! The planner asks the model for one compact search phrase as strict JSON.
//! Query planning is best-effort: any call or parse failure silently falls
//! back to a deterministic query built from the title and the opening words
//! of the body, so this path never fails a run.

use crate::llm::LLMClient;
use crate::research::parse::{first_json_object, plain_text, truncate_chars};
use crate::types::Article;
use std::sync::Arc;

/// Derives a compact web search query from an article.
pub struct QueryPlanner {
    llm: Arc<dyn LLMClient>,
}

impl QueryPlanner {
    /// Create a planner using the given model client.
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// Produce a search query for `article`. Infallible.
    pub async fn plan(&self, article: &Article) -> String {
        let title = article.title.trim();
        let plain = plain_text(&article.content_html);
        let snippet = plain
            .split_whitespace()
            .take(48)
            .collect::<Vec<_>>()
            .join(" ");
        let fallback = format!("{} {}", title, snippet).trim().to_string();

        let system = "You craft short, precise web search queries. Return strict JSON only.";
        let prompt = format!(
            "Summarize the article into one concise search phrase. \
             Return JSON with key searchQuery. \
             Rules:\n\
             - 6 to 12 words.\n\
             - No quotes or punctuation.\n\
             - Include key entities and topic.\n\n\
             Title: {}\n\
             Content: {}\n",
            if title.is_empty() { "Untitled" } else { title },
            truncate_chars(&plain, 1800),
        );

        let raw = match self.llm.generate_with_system(system, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(error = %e, "query planner model call failed, using fallback");
                return fallback;
            }
        };

        match first_json_object(&raw) {
            Ok(value) => {
                let query = value
                    .get("searchQuery")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .trim()
                    .to_string();
                if query.is_empty() {
                    fallback
                } else {
                    query
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "query planner output unparsable, using fallback");
                fallback
            }
        }
    }
}
