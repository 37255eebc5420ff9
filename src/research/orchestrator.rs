//! The research state machine and concurrency controller.
//!
//! `start` returns immediately with the queued record; the pipeline runs in
//! a spawned background task racing the mode's deadline. An in-memory set of
//! running article ids coalesces concurrent triggers for the same article,
//! and is released on every exit path. All record writes go through one
//! upsert helper that also publishes the update event.

use crate::db::{ArticleStore, LocalDb, ResearchStore};
use crate::events::{ResearchEventBus, ResearchUpdated};
use crate::llm::{LLMClient, OpenAIClient};
use crate::research::planner::QueryPlanner;
use crate::research::synthesizer::Synthesizer;
use crate::tools::fetch::{extract_text, PageFetcher, SafeFetcher};
use crate::tools::search::{SearchClient, SerperClient};
use crate::types::{
    AppError, ModeLimits, ResearchMode, ResearchPatch, ResearchRecord, ResearchStatus, Result,
    RunRequest, SourceRef,
};
use crate::utils::config::Config;
use crate::utils::time::expires_at_after;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Per-page download budget inside a run.
const PAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(8);
const PAGE_MAX_BYTES: usize = 1_500_000;

/// Sentinel summary persisted when the search returns nothing.
pub const NO_RESULT_SUMMARY: &str = "- No result found!";

/// Sequences the research pipeline for articles: one run per article,
/// fire-and-forget execution, deadline enforcement, event emission.
///
/// Cloning is cheap and shares all state, including the dedup gate.
#[derive(Clone)]
pub struct ResearchOrchestrator {
    store: Arc<dyn ResearchStore>,
    articles: Arc<dyn ArticleStore>,
    planner: Arc<QueryPlanner>,
    synthesizer: Arc<Synthesizer>,
    search: Arc<dyn SearchClient>,
    fetcher: Arc<dyn PageFetcher>,
    events: ResearchEventBus,
    running: Arc<Mutex<HashSet<i64>>>,
}

impl ResearchOrchestrator {
    /// Assemble an orchestrator from its collaborators.
    pub fn new(
        store: Arc<dyn ResearchStore>,
        articles: Arc<dyn ArticleStore>,
        llm: Arc<dyn LLMClient>,
        search: Arc<dyn SearchClient>,
        fetcher: Arc<dyn PageFetcher>,
        events: ResearchEventBus,
    ) -> Self {
        Self {
            store,
            articles,
            planner: Arc::new(QueryPlanner::new(llm.clone())),
            synthesizer: Arc::new(Synthesizer::new(llm)),
            search,
            fetcher,
            events,
            running: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Wire up the production collaborators from configuration, using the
    /// local database as both research store and article store.
    pub fn from_config(config: &Config, db: Arc<LocalDb>, events: ResearchEventBus) -> Result<Self> {
        let llm: Arc<dyn LLMClient> = Arc::new(OpenAIClient::new(
            config.llm.api_key.clone(),
            config.llm.api_base.clone(),
            config.llm.model.clone(),
        ));
        let search: Arc<dyn SearchClient> = Arc::new(SerperClient::with_endpoint(
            config.search.serper_api_key.clone(),
            config.search.endpoint.clone(),
        ));
        let fetcher: Arc<dyn PageFetcher> = Arc::new(SafeFetcher::new()?);

        Ok(Self::new(db.clone(), db, llm, search, fetcher, events))
    }

    /// Trigger a research run. Non-blocking: returns the current record
    /// immediately while the pipeline proceeds in the background.
    ///
    /// A trigger for an article that is already running does not start a
    /// second pipeline; it re-asserts `running` and returns.
    pub async fn start(&self, request: RunRequest) -> Result<ResearchRecord> {
        let article_id = request.article_id;

        let first_trigger = {
            let mut running = self.running.lock();
            if running.contains(&article_id) {
                false
            } else {
                running.insert(article_id);
                true
            }
        };

        if !first_trigger {
            tracing::debug!(article_id, "research already in flight, coalescing trigger");
            return self
                .upsert(article_id, ResearchPatch::status(ResearchStatus::Running))
                .await;
        }

        let queued = match self
            .upsert(
                article_id,
                ResearchPatch::status(ResearchStatus::Queued).clear_error(),
            )
            .await
        {
            Ok(record) => record,
            Err(e) => {
                self.running.lock().remove(&article_id);
                return Err(e);
            }
        };

        let task = self.clone();
        let mode = request.mode;
        tokio::spawn(async move {
            task.run(article_id, mode).await;
        });

        Ok(queued)
    }

    /// Read the current research record for an article.
    pub async fn get(&self, article_id: i64) -> Result<Option<ResearchRecord>> {
        self.store.get_research(article_id).await
    }

    /// Subscribe to research update events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ResearchUpdated> {
        self.events.subscribe()
    }

    async fn run(self, article_id: i64, mode: ResearchMode) {
        let limits = mode.limits();
        tracing::info!(article_id, mode = ?mode, "research run starting");

        let outcome = self.run_with_deadline(article_id, &limits).await;

        match outcome {
            Ok(()) => tracing::info!(article_id, "research run completed"),
            Err(e) => {
                tracing::warn!(article_id, error = %e, "research run failed");
                let patch = ResearchPatch::status(ResearchStatus::Failed).error(e.to_string());
                if let Err(db_err) = self.upsert(article_id, patch).await {
                    tracing::error!(article_id, error = %db_err, "failed to persist failure");
                }
            }
        }

        // The dedup marker must be released on every exit path.
        self.running.lock().remove(&article_id);
    }

    async fn run_with_deadline(&self, article_id: i64, limits: &ModeLimits) -> Result<()> {
        self.upsert(
            article_id,
            ResearchPatch::status(ResearchStatus::Running).clear_error(),
        )
        .await?;

        // The timeout drops the pipeline future, so a stage finishing late
        // can never write a stale success over the failed record.
        match tokio::time::timeout(limits.timeout, self.execute(article_id, limits)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout("Research timed out".to_string())),
        }
    }

    async fn execute(&self, article_id: i64, limits: &ModeLimits) -> Result<()> {
        let article = self
            .articles
            .get_article(article_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;

        let query = self.planner.plan(&article).await;
        tracing::debug!(article_id, query, "planned search query");

        let results = self.search.search(&query, limits.search_results).await?;

        if results.is_empty() {
            // "Nothing found" is a valid outcome, not an error.
            let patch = ResearchPatch::status(ResearchStatus::Ready)
                .summary(NO_RESULT_SUMMARY)
                .sources(Vec::new())
                .questions(Vec::new())
                .clear_error()
                .expires(expires_at_after(limits.ttl_hours));
            self.upsert(article_id, patch).await?;
            return Ok(());
        }

        let sources: Vec<SourceRef> = results
            .into_iter()
            .filter(|result| !result.url.is_empty())
            .take(limits.fetch_pages)
            .collect();

        let mut source_texts = Vec::with_capacity(sources.len());
        for source in &sources {
            match self
                .fetcher
                .fetch(&source.url, PAGE_FETCH_TIMEOUT, PAGE_MAX_BYTES)
                .await
            {
                Ok(html) => source_texts.push(extract_text(&html)),
                Err(e) => {
                    // A source that fails to fetch degrades to empty text.
                    tracing::debug!(article_id, url = %source.url, error = %e, "source fetch failed");
                    source_texts.push(String::new());
                }
            }
        }

        let synthesis = self
            .synthesizer
            .synthesize(&article, &sources, &source_texts)
            .await?;

        let patch = ResearchPatch::status(ResearchStatus::Ready)
            .summary(synthesis.summary_md)
            .sources(synthesis.sources)
            .questions(synthesis.questions)
            .clear_error()
            .expires(expires_at_after(limits.ttl_hours));
        self.upsert(article_id, patch).await?;

        Ok(())
    }

    /// Write through the store and publish the update event, enriched with
    /// the owning article's publish/author state for subscriber filtering.
    async fn upsert(&self, article_id: i64, patch: ResearchPatch) -> Result<ResearchRecord> {
        let record = self.store.upsert_research(article_id, patch).await?;
        let article = self.articles.get_article(article_id).await?;

        self.events.publish(ResearchUpdated {
            article_id,
            status: record.status,
            updated_at: record.updated_at.clone(),
            is_published: article.as_ref().map(|a| a.is_published).unwrap_or(false),
            author_user_id: article.as_ref().map(|a| a.author_user_id),
        });

        Ok(record)
    }
}
