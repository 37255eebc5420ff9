//! # A.R.I.A - Article Research Intelligence Agent
//!
//! A background research pipeline for a blog platform: given an article, it
//! plans a web search query, searches the web, fetches and sanitizes the top
//! result pages, synthesizes a cited Markdown brief with an LLM, and persists
//! the result with a mode-dependent freshness TTL.
//!
//! ## Overview
//!
//! The pipeline is fire-and-forget: triggering research returns immediately
//! with a `queued` record, and subscribers observe progress through
//! broadcast update events as the record moves through
//! `queued -> running -> ready | failed`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use aria::{Config, LocalDb, ResearchEventBus, ResearchOrchestrator, RunRequest};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> aria::Result<()> {
//!     let config = Config::from_env();
//!     let db = Arc::new(LocalDb::new_local(&config.database.path).await?);
//!     let orchestrator =
//!         ResearchOrchestrator::from_config(&config, db, ResearchEventBus::default())?;
//!
//!     let mut updates = orchestrator.subscribe();
//!     let queued = orchestrator.start(RunRequest::new(42)).await?;
//!     println!("research queued at {}", queued.updated_at);
//!
//!     while let Ok(event) = updates.recv().await {
//!         println!("article {} is now {}", event.article_id, event.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Research modes
//!
//! | Mode | Search results | Pages fetched | Deadline | TTL |
//! |------|----------------|---------------|----------|-----|
//! | `quick` | 5 | 3 | 20s | 12h |
//! | `standard` | 6 | 4 | 30s | 24h |
//! | `deep` | 8 | 5 | 40s | 168h |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Database access layer (libsql).
pub mod db;
/// Research update broadcast events.
pub mod events;
/// LLM client abstraction and OpenAI-compatible implementation.
pub mod llm;
/// The research pipeline: planning, synthesis, rate limiting, orchestration.
pub mod research;
/// Web tools: SSRF-guarded page fetching and web search.
pub mod tools;
/// Core types and error handling.
pub mod types;
/// Configuration and time utilities.
pub mod utils;

// Re-export commonly used items at the crate root.
pub use db::{ArticleStore, LocalDb, ResearchStore};
pub use events::{ResearchEventBus, ResearchUpdated};
pub use llm::{LLMClient, OpenAIClient};
pub use research::{ResearchOrchestrator, ResearchRateLimiter};
pub use tools::{PageFetcher, SafeFetcher, SearchClient, SerperClient};
pub use types::{
    AppError, Article, ResearchMode, ResearchRecord, ResearchStatus, Result, RunRequest, SourceRef,
};
pub use utils::config::Config;
