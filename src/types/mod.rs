//! Core types shared across the research pipeline: records, run requests,
//! mode limits, and error handling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ============= Research Record Types =============

/// Lifecycle status of an article's research record.
///
/// Transitions only move forward through `queued -> running -> ready|failed`
/// within a single run; a new trigger from a terminal state re-enters `queued`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchStatus {
    /// No research has been requested yet.
    #[default]
    None,
    /// A run was accepted and is waiting for its background task.
    Queued,
    /// The background pipeline is executing.
    Running,
    /// The pipeline completed and the summary is available.
    Ready,
    /// The pipeline failed; `error_message` carries the reason.
    Failed,
}

impl ResearchStatus {
    /// Stable string form used for the database TEXT column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchStatus::None => "none",
            ResearchStatus::Queued => "queued",
            ResearchStatus::Running => "running",
            ResearchStatus::Ready => "ready",
            ResearchStatus::Failed => "failed",
        }
    }

    /// Parse a stored status string; unknown values map to `None`.
    pub fn parse(value: &str) -> Self {
        match value {
            "queued" => ResearchStatus::Queued,
            "running" => ResearchStatus::Running,
            "ready" => ResearchStatus::Ready,
            "failed" => ResearchStatus::Failed,
            _ => ResearchStatus::None,
        }
    }
}

impl fmt::Display for ResearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One external source backing a research summary.
///
/// Serialized with camelCase keys to stay compatible with previously stored
/// `sources_json` rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceRef {
    /// Page or result title.
    pub title: String,
    /// Source URL; entries without one are dropped during normalization.
    pub url: String,
    /// Short search-result snippet.
    pub snippet: String,
    /// Publishing site or organization.
    pub publisher: String,
    /// Publication date as reported by the search API (free-form).
    pub published_at: String,
}

/// The persisted research state for one article (1:1 by `article_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRecord {
    /// Owning article id (unique key).
    pub article_id: i64,
    /// Current lifecycle status.
    pub status: ResearchStatus,
    /// Markdown bullet summary with inline citations; empty until ready.
    pub summary_md: String,
    /// Ordered, deduplicated source list.
    pub sources: Vec<SourceRef>,
    /// Follow-up questions suggested by the synthesizer.
    pub questions: Vec<String>,
    /// Failure reason; present only when `status` is `failed`.
    pub error_message: Option<String>,
    /// Creation timestamp, `YYYY-MM-DD HH:MM:SS` in the civil timezone.
    pub created_at: String,
    /// Last-write timestamp, refreshed on every upsert.
    pub updated_at: String,
    /// Advisory staleness horizon; callers decide whether to re-trigger.
    pub expires_at: Option<String>,
}

/// Partial update applied to a research record through the upsert path.
///
/// `None` fields keep the existing value. `error_message` and `expires_at`
/// use a nested `Option` so a patch can distinguish "leave as is" from
/// "clear the column".
#[derive(Debug, Clone, Default)]
pub struct ResearchPatch {
    /// New status, if changing.
    pub status: Option<ResearchStatus>,
    /// New summary text, if changing.
    pub summary_md: Option<String>,
    /// New source list, if changing.
    pub sources: Option<Vec<SourceRef>>,
    /// New question list, if changing.
    pub questions: Option<Vec<String>>,
    /// `Some(Some(msg))` records a failure, `Some(None)` clears it.
    pub error_message: Option<Option<String>>,
    /// `Some(Some(ts))` sets the expiry, `Some(None)` clears it.
    pub expires_at: Option<Option<String>>,
}

impl ResearchPatch {
    /// Start a patch that moves the record to `status`.
    pub fn status(status: ResearchStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Set the summary text.
    pub fn summary(mut self, summary_md: impl Into<String>) -> Self {
        self.summary_md = Some(summary_md.into());
        self
    }

    /// Set the source list.
    pub fn sources(mut self, sources: Vec<SourceRef>) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Set the question list.
    pub fn questions(mut self, questions: Vec<String>) -> Self {
        self.questions = Some(questions);
        self
    }

    /// Record a failure message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(Some(message.into()));
        self
    }

    /// Clear any previously recorded failure message.
    pub fn clear_error(mut self) -> Self {
        self.error_message = Some(None);
        self
    }

    /// Set the expiry timestamp.
    pub fn expires(mut self, expires_at: impl Into<String>) -> Self {
        self.expires_at = Some(Some(expires_at.into()));
        self
    }
}

// ============= Run Request Types =============

/// Resource-limit profile for a research run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchMode {
    /// Fewest sources, tightest deadline, shortest TTL.
    Quick,
    /// Balanced default.
    #[default]
    Standard,
    /// Widest search and longest TTL.
    Deep,
}

/// Concrete limits selected by a [`ResearchMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeLimits {
    /// Maximum search results requested from the search API.
    pub search_results: usize,
    /// Maximum pages fetched and fed to the synthesizer.
    pub fetch_pages: usize,
    /// Whole-run deadline; exceeding it fails the run.
    pub timeout: Duration,
    /// Time-to-live applied to a ready record.
    pub ttl_hours: i64,
}

impl ResearchMode {
    /// Resolve the resource limits for this mode.
    pub fn limits(&self) -> ModeLimits {
        match self {
            ResearchMode::Quick => ModeLimits {
                search_results: 5,
                fetch_pages: 3,
                timeout: Duration::from_secs(20),
                ttl_hours: 12,
            },
            ResearchMode::Standard => ModeLimits {
                search_results: 6,
                fetch_pages: 4,
                timeout: Duration::from_secs(30),
                ttl_hours: 24,
            },
            ResearchMode::Deep => ModeLimits {
                search_results: 8,
                fetch_pages: 5,
                timeout: Duration::from_secs(40),
                ttl_hours: 24 * 7,
            },
        }
    }
}

/// Transient trigger payload consumed by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// Article to research.
    pub article_id: i64,
    /// Resource profile; defaults to `standard`.
    #[serde(default)]
    pub mode: ResearchMode,
}

impl RunRequest {
    /// Build a request with the default (`standard`) mode.
    pub fn new(article_id: i64) -> Self {
        Self {
            article_id,
            mode: ResearchMode::default(),
        }
    }

    /// Build a request with an explicit mode.
    pub fn with_mode(article_id: i64, mode: ResearchMode) -> Self {
        Self { article_id, mode }
    }
}

// ============= External Collaborator Types =============

/// Article row shape consumed from the (external) article store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Article id.
    pub id: i64,
    /// Title, used for query planning and prompts.
    pub title: String,
    /// Raw HTML body as authored.
    pub content_html: String,
    /// Whether the article is publicly visible.
    pub is_published: bool,
    /// Owning author's user id.
    pub author_user_id: i64,
}

// ============= Error Types =============

/// Crate-wide error taxonomy.
///
/// Pipeline-level failures are caught at the orchestrator boundary and
/// persisted as a `failed` record; per-source fetch failures are degraded to
/// empty text and never reach that boundary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing external credential (search or LLM); surfaces at call time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Database error from the research or article store.
    #[error("Database error: {0}")]
    Database(String),

    /// Language-model call failed.
    #[error("LLM error: {0}")]
    LLM(String),

    /// Search API returned a non-success response or malformed payload.
    #[error("Search failed: {0}")]
    Search(String),

    /// Fetch target rejected before any network I/O (SSRF guard).
    #[error("Blocked URL: {0}")]
    BlockedUrl(String),

    /// Fetch transport failure or non-2xx response.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Fetched body exceeded the caller's byte cap mid-stream.
    #[error("Response exceeds size limit")]
    SizeExceeded,

    /// A deadline elapsed (per-fetch or whole-run).
    #[error("{0}")]
    Timeout(String),

    /// Language model did not return a decodable structured payload.
    #[error("Synthesis parse error: {0}")]
    SynthesisParse(String),

    /// Referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Trigger denied by the fixed-window rate limiter.
    #[error("Rate limit exceeded, retry in {0}ms")]
    RateLimited(u64),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ResearchStatus::None,
            ResearchStatus::Queued,
            ResearchStatus::Running,
            ResearchStatus::Ready,
            ResearchStatus::Failed,
        ] {
            assert_eq!(ResearchStatus::parse(status.as_str()), status);
        }
        assert_eq!(ResearchStatus::parse("garbage"), ResearchStatus::None);
    }

    #[test]
    fn test_mode_limits_table() {
        let quick = ResearchMode::Quick.limits();
        assert_eq!(quick.search_results, 5);
        assert_eq!(quick.fetch_pages, 3);
        assert_eq!(quick.timeout, Duration::from_secs(20));
        assert_eq!(quick.ttl_hours, 12);

        let standard = ResearchMode::Standard.limits();
        assert_eq!(standard.search_results, 6);
        assert_eq!(standard.fetch_pages, 4);
        assert_eq!(standard.timeout, Duration::from_secs(30));
        assert_eq!(standard.ttl_hours, 24);

        let deep = ResearchMode::Deep.limits();
        assert_eq!(deep.search_results, 8);
        assert_eq!(deep.fetch_pages, 5);
        assert_eq!(deep.timeout, Duration::from_secs(40));
        assert_eq!(deep.ttl_hours, 168);
    }

    #[test]
    fn test_default_mode_is_standard() {
        assert_eq!(ResearchMode::default(), ResearchMode::Standard);
        assert_eq!(RunRequest::new(1).mode, ResearchMode::Standard);
    }

    #[test]
    fn test_source_ref_camel_case_keys() {
        let source = SourceRef {
            title: "t".into(),
            url: "https://example.com".into(),
            snippet: "s".into(),
            publisher: "p".into(),
            published_at: "2024-01-01".into(),
        };
        let json = serde_json::to_value(&source).unwrap();
        assert!(json.get("publishedAt").is_some());
        assert!(json.get("published_at").is_none());
    }

    #[test]
    fn test_patch_builders() {
        let patch = ResearchPatch::status(ResearchStatus::Failed).error("boom");
        assert_eq!(patch.status, Some(ResearchStatus::Failed));
        assert_eq!(patch.error_message, Some(Some("boom".to_string())));

        let patch = ResearchPatch::status(ResearchStatus::Ready).clear_error();
        assert_eq!(patch.error_message, Some(None));
        assert!(patch.summary_md.is_none());
    }
}
