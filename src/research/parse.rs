//! Shared plumbing for prompt construction and strict-JSON model output.

use crate::tools::fetch::extract_text;
use crate::types::{AppError, Result};
use serde_json::Value;

/// Extract the first well-formed JSON object from raw model output.
///
/// Models wrap JSON in prose or code fences often enough that strict
/// whole-response parsing is useless; instead the span from the first `{` to
/// the last `}` is decoded.
pub(crate) fn first_json_object(raw: &str) -> Result<Value> {
    let start = raw
        .find('{')
        .ok_or_else(|| AppError::SynthesisParse("LLM output missing JSON".to_string()))?;
    let end = raw
        .rfind('}')
        .filter(|end| *end >= start)
        .ok_or_else(|| AppError::SynthesisParse("LLM output missing JSON".to_string()))?;

    serde_json::from_str(&raw[start..=end])
        .map_err(|e| AppError::SynthesisParse(format!("invalid JSON payload: {}", e)))
}

/// Flatten article HTML to a single-line plain text for prompts.
pub(crate) fn plain_text(html: &str) -> String {
    extract_text(html)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_json_object_plain() {
        let value = first_json_object(r#"{"searchQuery": "rust async runtimes"}"#).unwrap();
        assert_eq!(value["searchQuery"], "rust async runtimes");
    }

    #[test]
    fn test_first_json_object_with_surrounding_prose() {
        let raw = "Sure! Here you go:\n```json\n{\"a\": 1}\n```\nHope that helps.";
        let value = first_json_object(raw).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_first_json_object_missing() {
        assert!(matches!(
            first_json_object("no structure here"),
            Err(AppError::SynthesisParse(_))
        ));
    }

    #[test]
    fn test_first_json_object_undecodable() {
        assert!(matches!(
            first_json_object("{not json}"),
            Err(AppError::SynthesisParse(_))
        ));
    }

    #[test]
    fn test_plain_text_flattens_markup() {
        let text = plain_text("<p>Hello</p><p>world</p>");
        assert_eq!(text, "Hello world");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }
}
