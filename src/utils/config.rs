//! Environment-based configuration.
//!
//! Credentials are optional at load time so the application can start
//! without AI keys configured; a missing key only fails the research runs
//! that need it.

use serde::Deserialize;
use std::env;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Web search settings.
    pub search: SearchConfig,
    /// Language-model settings.
    pub llm: LLMConfig,
    /// Database settings.
    pub database: DatabaseConfig,
}

/// Web search API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Serper API key; absence fails searches at call time.
    pub serper_api_key: Option<String>,
    /// Search endpoint, overridable for tests.
    pub endpoint: String,
}

/// Language-model endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    /// API key; absence fails model calls at call time.
    pub api_key: Option<String>,
    /// OpenAI-compatible base URL.
    pub api_base: String,
    /// Model identifier.
    pub model: String,
}

/// Database settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the local libsql database file.
    pub path: String,
}

/// Chat completion endpoint (OpenAI-compatible mode), Singapore region.
const DASHSCOPE_COMPAT_BASE_URL: &str = "https://dashscope-intl.aliyuncs.com/compatible-mode/v1";

impl Config {
    /// Load configuration from the environment (and `.env` if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Config {
            search: SearchConfig {
                serper_api_key: env::var("SERPER_API_KEY").ok().filter(|k| !k.is_empty()),
                endpoint: env::var("SERPER_ENDPOINT")
                    .unwrap_or_else(|_| crate::tools::search::SERPER_ENDPOINT.to_string()),
            },
            llm: LLMConfig {
                api_key: env::var("DASHSCOPE_API_KEY")
                    .or_else(|_| env::var("OPENAI_API_KEY"))
                    .ok()
                    .filter(|k| !k.is_empty()),
                api_base: env::var("LLM_API_BASE")
                    .unwrap_or_else(|_| DASHSCOPE_COMPAT_BASE_URL.to_string()),
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "qwen-plus".to_string()),
            },
            database: DatabaseConfig {
                path: env::var("DATABASE_PATH").unwrap_or_else(|_| "data/aria.db".to_string()),
            },
        }
    }
}
