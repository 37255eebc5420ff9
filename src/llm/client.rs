use crate::types::Result;
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction.
///
/// The research pipeline only needs plain chat completions; both the query
/// planner and the summary synthesizer call [`generate_with_system`]
/// and treat the raw text as strict-JSON output to be parsed downstream.
///
/// [`generate_with_system`]: LLMClient::generate_with_system
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate a completion with a system prompt for context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier.
    fn model_name(&self) -> &str;
}
