//! Collaborator trait definitions.
//!
//! These async traits are the engine's only view of the outside world. The
//! `assessify-clients` crate supplies the HTTP and cache implementations.

use async_trait::async_trait;

use crate::model::{QuestionSetHierarchy, SourceDoc};

/// Read-only access to question-set and question documents.
#[async_trait]
pub trait HierarchyFetcher: Send + Sync {
    /// Fetch the full question-set hierarchy for one reference identifier.
    async fn fetch_question_set(&self, id: &str) -> anyhow::Result<QuestionSetHierarchy>;

    /// Fetch a single question document.
    async fn fetch_question(&self, id: &str) -> anyhow::Result<SourceDoc>;
}

/// Get/set-with-TTL cache keyed by the reference question-set identifier.
///
/// The engine treats every error from this trait as fail-open: a read error
/// is a miss, a write error is a skipped write. Implementations should not
/// try to hide failures themselves.
#[async_trait]
pub trait CacheGateway: Send + Sync {
    /// Read the cached serialized bundle, if present.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Store a serialized bundle, expiring after `ttl_secs`.
    async fn set_with_ttl(&self, key: &str, ttl_secs: u64, value: &str) -> anyhow::Result<()>;
}
