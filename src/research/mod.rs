//! Article research pipeline.
//!
//! Given an article, the pipeline formulates a web search query, fetches and
//! sanitizes external pages, synthesizes a cited summary via a language
//! model, and persists the result with a time-to-live.
//!
//! # Architecture
//!
//! - [`orchestrator::ResearchOrchestrator`] - the state machine and
//!   concurrency controller; one run per article, fire-and-forget
//!   background execution, whole-run deadline.
//! - [`planner::QueryPlanner`] - derives the search query, with a
//!   deterministic fallback when the model call fails.
//! - [`synthesizer::Synthesizer`] - produces the cited bullet summary and
//!   follow-up questions from fetched source texts.
//! - [`rate_limit::ResearchRateLimiter`] - fixed-window trigger limiter,
//!   invoked by the (external) HTTP caller before the orchestrator.
//!
//! # Run lifecycle
//!
//! ```text
//! none -> queued -> running -> ready
//!                          \-> failed
//! ```
//!
//! A trigger while a run is in flight is coalesced into the existing run; a
//! trigger from a terminal state starts a fresh run back at `queued`.

/// The research state machine and concurrency controller.
pub mod orchestrator;
pub(crate) mod parse;
/// Search query derivation.
pub mod planner;
/// Fixed-window trigger rate limiting.
pub mod rate_limit;
/// Cited summary synthesis.
pub mod synthesizer;

pub use orchestrator::ResearchOrchestrator;
pub use planner::QueryPlanner;
pub use rate_limit::{RateDecision, ResearchRateLimiter};
pub use synthesizer::{SynthesisResult, Synthesizer};
