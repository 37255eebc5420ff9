//! Research update event fan-out.
//!
//! The orchestrator publishes a [`ResearchUpdated`] notification after every
//! persisted state change on a single global stream. Subscribers (e.g. a
//! live client-update channel) apply their own access filtering using the
//! article's publish/author state carried on the event.

use crate::types::ResearchStatus;
use serde::Serialize;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

/// Notification emitted after each research record write.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchUpdated {
    /// Article whose record changed.
    pub article_id: i64,
    /// Status after the write.
    pub status: ResearchStatus,
    /// Timestamp of the write.
    pub updated_at: String,
    /// Whether the owning article is publicly visible.
    pub is_published: bool,
    /// Owning author, when the article row exists.
    pub author_user_id: Option<i64>,
}

/// Broadcast bus for research update events.
///
/// Cloning shares the underlying channel. Publishing with no subscribers is
/// a no-op; slow subscribers may observe lagged receives, which is
/// acceptable for a live-update feed.
#[derive(Clone)]
pub struct ResearchEventBus {
    tx: broadcast::Sender<ResearchUpdated>,
}

impl Default for ResearchEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ResearchEventBus {
    /// Create a bus retaining up to `capacity` undelivered events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ResearchUpdated> {
        self.tx.subscribe()
    }

    /// Publish an event to current subscribers.
    pub fn publish(&self, event: ResearchUpdated) {
        // send only errors when there are no receivers; that's fine.
        let _ = self.tx.send(event);
    }
}
