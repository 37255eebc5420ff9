//! Cited summary synthesis.
//!
//! The synthesizer prompts the model with the article and the sanitized
//! source texts, demanding strict JSON with a bullet summary, a source list,
//! and follow-up questions. Unlike query planning, a failure here fails the
//! run. Post-processing guarantees every bullet carries an inline citation
//! when sources exist.

use crate::llm::LLMClient;
use crate::research::parse::{first_json_object, plain_text, truncate_chars};
use crate::types::{Article, Result, SourceRef};
use serde_json::Value;
use std::sync::Arc;

/// Structured output of one synthesis call.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    /// Bullet summary with inline citations.
    pub summary_md: String,
    /// Final source list (model-provided, or the search results as fallback).
    pub sources: Vec<SourceRef>,
    /// Follow-up questions for weak evidence.
    pub questions: Vec<String>,
}

/// Produces cited summaries from fetched source texts.
pub struct Synthesizer {
    llm: Arc<dyn LLMClient>,
}

impl Synthesizer {
    /// Create a synthesizer using the given model client.
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// Summarize `source_texts` for `article`, validating the model output
    /// against the strict three-field contract.
    pub async fn synthesize(
        &self,
        article: &Article,
        sources: &[SourceRef],
        source_texts: &[String],
    ) -> Result<SynthesisResult> {
        let system = "You produce compact, cited summaries for a reader. \
                      Always follow the JSON schema exactly and avoid extra text.";
        let prompt = build_summary_prompt(article, sources, source_texts);

        let raw = self.llm.generate_with_system(system, &prompt).await?;
        let value = first_json_object(&raw)?;

        let summary_md = value
            .get("summaryMd")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim()
            .to_string();
        let questions = normalize_questions(value.get("questions"));
        let parsed_sources = normalize_value_sources(value.get("sources"));

        let final_sources = if parsed_sources.is_empty() {
            normalize_sources(sources)
        } else {
            parsed_sources
        };

        let summary_md = add_inline_citations(&summary_md, &final_sources);

        Ok(SynthesisResult {
            summary_md,
            sources: final_sources,
            questions,
        })
    }
}

fn build_summary_prompt(
    article: &Article,
    sources: &[SourceRef],
    source_texts: &[String],
) -> String {
    let title = if article.title.is_empty() {
        "Untitled"
    } else {
        article.title.as_str()
    };
    let plain = plain_text(&article.content_html);

    let source_block = sources
        .iter()
        .enumerate()
        .map(|(idx, source)| {
            let text = source_texts.get(idx).map(String::as_str).unwrap_or("");
            format!(
                "Source {}:\nTitle: {}\nURL: {}\nSnippet: {}\nText: {}",
                idx + 1,
                source.title,
                source.url,
                source.snippet,
                truncate_chars(text, 1800),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a research assistant summarizing external info for a reader.\n\
         Return strict JSON with keys: summaryMd (bullet list), sources (array), questions (array).\n\
         Rules:\n\
         - Keep summary to 3-8 bullet points.\n\
         - Cite sources by including the URL in each bullet when possible.\n\
         - Use only the provided sources; do not invent URLs.\n\
         - If evidence is weak, include questions to verify.\n\n\
         Article title: {}\n\
         Article content: {}\n\n\
         Sources:\n{}\n",
        title,
        truncate_chars(&plain, 2000),
        source_block,
    )
}

/// Normalize a model-provided source array, coercing missing or non-string
/// fields to empty strings and dropping url-less entries.
fn normalize_value_sources(value: Option<&Value>) -> Vec<SourceRef> {
    let Some(items) = value.and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| {
            let field = |key: &str| {
                item.get(key)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .trim()
                    .to_string()
            };
            SourceRef {
                title: field("title"),
                url: field("url"),
                snippet: field("snippet"),
                publisher: field("publisher"),
                published_at: field("publishedAt"),
            }
        })
        .filter(|source| !source.url.is_empty())
        .collect()
}

/// Trim an already-typed source list and drop url-less entries.
fn normalize_sources(sources: &[SourceRef]) -> Vec<SourceRef> {
    sources
        .iter()
        .map(|source| SourceRef {
            title: source.title.trim().to_string(),
            url: source.url.trim().to_string(),
            snippet: source.snippet.trim().to_string(),
            publisher: source.publisher.trim().to_string(),
            published_at: source.published_at.trim().to_string(),
        })
        .filter(|source| !source.url.is_empty())
        .collect()
}

fn normalize_questions(value: Option<&Value>) -> Vec<String> {
    let Some(items) = value.and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| item.as_str())
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect()
}

fn bullet_has_url(bullet: &str) -> bool {
    let lower = bullet.to_ascii_lowercase();
    lower.contains("http://") || lower.contains("https://")
}

/// Ensure every bullet line carries a citation.
///
/// Bullets already containing a URL are left untouched; the rest are
/// annotated with source URLs cycled round-robin.
fn add_inline_citations(summary_md: &str, sources: &[SourceRef]) -> String {
    if summary_md.is_empty() || sources.is_empty() {
        return summary_md.to_string();
    }

    let bullets: Vec<&str> = summary_md
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.strip_prefix('-').map(str::trim_start).unwrap_or(line))
        .collect();

    if bullets.is_empty() {
        return summary_md.to_string();
    }

    let mut next_source = 0usize;
    let cited: Vec<String> = bullets
        .into_iter()
        .map(|bullet| {
            if bullet_has_url(bullet) {
                return bullet.to_string();
            }
            let url = &sources[next_source % sources.len()].url;
            next_source += 1;
            if url.is_empty() {
                bullet.to_string()
            } else {
                format!("{} ({})", bullet, url)
            }
        })
        .collect();

    cited
        .into_iter()
        .map(|line| format!("- {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
