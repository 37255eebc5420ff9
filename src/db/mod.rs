//! Persistence for research records and the article collaborator interface.
//!
//! The orchestrator talks to storage through the [`ResearchStore`] and
//! [`ArticleStore`] traits; [`LocalDb`] implements both over a local libsql
//! database (`:memory:` in tests).

/// Local libsql-backed store.
pub mod local;
/// Storage trait seams.
pub mod traits;

pub use local::LocalDb;
pub use traits::{ArticleStore, ResearchStore};
