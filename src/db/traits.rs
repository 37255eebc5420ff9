use crate::types::{Article, ResearchPatch, ResearchRecord, Result};
use async_trait::async_trait;

/// Persistence of the current research record per article.
///
/// The upsert path reads, merges, and writes; that is safe without extra
/// locking because the orchestrator's dedup gate guarantees a single writer
/// per article.
#[async_trait]
pub trait ResearchStore: Send + Sync {
    /// Fetch the research record for an article, if any.
    async fn get_research(&self, article_id: i64) -> Result<Option<ResearchRecord>>;

    /// Create or update the record for an article, returning the row as
    /// persisted. Creation is insert-if-absent; `created_at` is set once and
    /// `updated_at` refreshed on every write.
    async fn upsert_research(
        &self,
        article_id: i64,
        patch: ResearchPatch,
    ) -> Result<ResearchRecord>;
}

/// Read-only access to the (external) article store.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Fetch an article row, or `None` when it does not exist.
    async fn get_article(&self, article_id: i64) -> Result<Option<Article>>;
}
