//! Network-facing tools used by the research pipeline.
//!
//! - [`fetch`] - SSRF-guarded page fetching with size/time budgets, plus
//!   HTML-to-text sanitization for synthesizer input.
//! - [`search`] - web search against the Serper API.

/// SSRF-guarded page fetcher and text extraction.
pub mod fetch;
/// Web search client.
pub mod search;

pub use fetch::{extract_text, PageFetcher, SafeFetcher};
pub use search::{SearchClient, SerperClient};
