//! Language-model access for query planning and summary synthesis.
//!
//! The pipeline talks to a single OpenAI-compatible chat-completions
//! endpoint through the [`LLMClient`] trait, so tests can substitute a
//! scripted client and the provider can be swapped without touching the
//! orchestrator.

/// Provider-agnostic client trait.
pub mod client;
/// OpenAI-compatible chat-completions client.
pub mod openai;

pub use client::LLMClient;
pub use openai::OpenAIClient;
