use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

/// Client for OpenAI-compatible chat-completions endpoints.
///
/// The default deployment points at DashScope's compatible-mode API, but any
/// endpoint speaking the OpenAI wire format works. The underlying client is
/// built lazily per call so the application can start without an API key
/// configured; the missing credential only fails research runs that need it.
pub struct OpenAIClient {
    api_key: Option<String>,
    api_base: String,
    model: String,
}

impl OpenAIClient {
    /// Create a client for the given endpoint and model.
    pub fn new(api_key: Option<String>, api_base: String, model: String) -> Self {
        Self {
            api_key,
            api_base,
            model,
        }
    }

    fn client(&self) -> Result<Client<OpenAIConfig>> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                AppError::Configuration(
                    "Missing DASHSCOPE_API_KEY or OPENAI_API_KEY environment variable".to_string(),
                )
            })?;

        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&self.api_base);

        Ok(Client::with_config(config))
    }

    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .max_tokens(1000u32)
            .build()
            .map_err(|e| AppError::LLM(format!("Failed to build request: {}", e)))?;

        let response = self
            .client()?
            .chat()
            .create(request)
            .await
            .map_err(|e| AppError::LLM(format!("Chat completion error: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::LLM("No response from model".to_string()))
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage::from(prompt.to_string()),
        )])
        .await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.complete(vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage::from(
                system.to_string(),
            )),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(
                prompt.to_string(),
            )),
        ])
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_is_configuration_error() {
        let client = OpenAIClient::new(
            None,
            "https://dashscope-intl.aliyuncs.com/compatible-mode/v1".to_string(),
            "qwen-plus".to_string(),
        );

        let result = client.generate("hello").await;
        match result {
            Err(AppError::Configuration(msg)) => {
                assert!(msg.contains("DASHSCOPE_API_KEY"));
            }
            other => panic!("expected configuration error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_model_name() {
        let client = OpenAIClient::new(None, "http://localhost".to_string(), "qwen-plus".into());
        assert_eq!(client.model_name(), "qwen-plus");
    }
}
