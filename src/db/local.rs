use crate::db::traits::{ArticleStore, ResearchStore};
use crate::types::{
    AppError, Article, ResearchPatch, ResearchRecord, ResearchStatus, Result, SourceRef,
};
use crate::utils::time::now_nz_sqlite;
use async_trait::async_trait;
use libsql::{params, Builder, Connection, Database};

/// Local libsql database holding research records and article rows.
pub struct LocalDb {
    _db: Database,
    conn: Connection,
}

impl LocalDb {
    /// Open (or create) a database at `path` and initialize the schema.
    pub async fn new_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        // One connection for the store's lifetime. A `:memory:` database
        // exists per connection, so a connection-per-call store would lose
        // the bootstrapped schema between calls.
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        let client = Self { _db: db, conn };
        client.initialize_schema().await?;

        Ok(client)
    }

    /// Open an in-memory database (tests).
    pub async fn new_memory() -> Result<Self> {
        Self::new_local(":memory:").await
    }

    fn connection(&self) -> Result<Connection> {
        Ok(self.conn.clone())
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content_html TEXT NOT NULL,
                is_published INTEGER NOT NULL DEFAULT 0,
                author_user_id INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create articles table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS article_research (
                article_id INTEGER PRIMARY KEY,
                status TEXT NOT NULL,
                summary_md TEXT NOT NULL DEFAULT '',
                sources_json TEXT NOT NULL DEFAULT '[]',
                questions_json TEXT NOT NULL DEFAULT '[]',
                error_message TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                expires_at TEXT
            )",
            (),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to create article_research table: {}", e))
        })?;

        Ok(())
    }

    /// Insert an article row, returning its id. The blog platform owns the
    /// real articles table; this helper exists so the pipeline can be
    /// exercised end to end in tests and demos.
    pub async fn create_article(
        &self,
        title: &str,
        content_html: &str,
        is_published: bool,
        author_user_id: i64,
    ) -> Result<i64> {
        let conn = self.connection()?;

        conn.execute(
            "INSERT INTO articles (title, content_html, is_published, author_user_id)
             VALUES (?, ?, ?, ?)",
            (title, content_html, is_published as i64, author_user_id),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create article: {}", e)))?;

        Ok(conn.last_insert_rowid())
    }

    async fn query_research(
        &self,
        conn: &Connection,
        article_id: i64,
    ) -> Result<Option<ResearchRecord>> {
        let mut rows = conn
            .query(
                "SELECT article_id, status, summary_md, sources_json, questions_json,
                        error_message, created_at, updated_at, expires_at
                 FROM article_research WHERE article_id = ?",
                [article_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query research: {}", e)))?;

        let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let get_text = |idx: i32, row: &libsql::Row| -> Result<String> {
            row.get::<String>(idx)
                .map_err(|e| AppError::Database(e.to_string()))
        };

        let status_text = get_text(1, &row)?;
        let sources_json = get_text(3, &row)?;
        let questions_json = get_text(4, &row)?;

        // Stored JSON is written by this crate; tolerate hand-edited rows by
        // defaulting to empty lists rather than failing reads.
        let sources: Vec<SourceRef> = serde_json::from_str(&sources_json).unwrap_or_default();
        let questions: Vec<String> = serde_json::from_str(&questions_json).unwrap_or_default();

        Ok(Some(ResearchRecord {
            article_id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
            status: ResearchStatus::parse(&status_text),
            summary_md: get_text(2, &row)?,
            sources,
            questions,
            error_message: row.get(5).map_err(|e| AppError::Database(e.to_string()))?,
            created_at: get_text(6, &row)?,
            updated_at: get_text(7, &row)?,
            expires_at: row.get(8).map_err(|e| AppError::Database(e.to_string()))?,
        }))
    }
}

#[async_trait]
impl ResearchStore for LocalDb {
    async fn get_research(&self, article_id: i64) -> Result<Option<ResearchRecord>> {
        let conn = self.connection()?;
        self.query_research(&conn, article_id).await
    }

    async fn upsert_research(
        &self,
        article_id: i64,
        patch: ResearchPatch,
    ) -> Result<ResearchRecord> {
        let conn = self.connection()?;
        let existing = self.query_research(&conn, article_id).await?;
        let now = now_nz_sqlite();

        // Read-merge-write; safe under the orchestrator's one-writer-per-
        // article dedup gate.
        let (status, summary_md, sources, questions, error_message, expires_at) = match &existing {
            Some(current) => (
                patch.status.unwrap_or(current.status),
                patch.summary_md.unwrap_or_else(|| current.summary_md.clone()),
                patch.sources.unwrap_or_else(|| current.sources.clone()),
                patch.questions.unwrap_or_else(|| current.questions.clone()),
                patch
                    .error_message
                    .unwrap_or_else(|| current.error_message.clone()),
                patch
                    .expires_at
                    .unwrap_or_else(|| current.expires_at.clone()),
            ),
            None => (
                patch.status.unwrap_or_default(),
                patch.summary_md.unwrap_or_default(),
                patch.sources.unwrap_or_default(),
                patch.questions.unwrap_or_default(),
                patch.error_message.unwrap_or_default(),
                patch.expires_at.unwrap_or_default(),
            ),
        };

        let sources_json = serde_json::to_string(&sources)
            .map_err(|e| AppError::Database(format!("Failed to encode sources: {}", e)))?;
        let questions_json = serde_json::to_string(&questions)
            .map_err(|e| AppError::Database(format!("Failed to encode questions: {}", e)))?;

        if existing.is_none() {
            conn.execute(
                "INSERT INTO article_research
                 (article_id, status, summary_md, sources_json, questions_json,
                  error_message, created_at, updated_at, expires_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    article_id,
                    status.as_str(),
                    summary_md,
                    sources_json,
                    questions_json,
                    error_message,
                    now.clone(),
                    now,
                    expires_at,
                ],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert research: {}", e)))?;
        } else {
            conn.execute(
                "UPDATE article_research
                 SET status = ?, summary_md = ?, sources_json = ?, questions_json = ?,
                     error_message = ?, updated_at = ?, expires_at = ?
                 WHERE article_id = ?",
                params![
                    status.as_str(),
                    summary_md,
                    sources_json,
                    questions_json,
                    error_message,
                    now,
                    expires_at,
                    article_id,
                ],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to update research: {}", e)))?;
        }

        self.query_research(&conn, article_id)
            .await?
            .ok_or_else(|| AppError::Database("Upserted research row missing".to_string()))
    }
}

#[async_trait]
impl ArticleStore for LocalDb {
    async fn get_article(&self, article_id: i64) -> Result<Option<Article>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, title, content_html, is_published, author_user_id
                 FROM articles WHERE id = ?",
                [article_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query article: {}", e)))?;

        let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        Ok(Some(Article {
            id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
            content_html: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
            is_published: row
                .get::<i64>(3)
                .map_err(|e| AppError::Database(e.to_string()))?
                != 0,
            author_user_id: row.get(4).map_err(|e| AppError::Database(e.to_string()))?,
        }))
    }
}
