//! Cached query/answer records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One memoized provider answer, keyed by the embedding of its query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Entry ID
    pub id: Uuid,
    /// Namespace the entry belongs to (the executor id when used by the graph)
    pub scope: String,
    /// Original query text
    pub query: String,
    /// Stored answer
    pub answer: String,
    /// Embedding of `query`
    pub embedding: Vec<f32>,
    /// When the entry was stored
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create a new entry stamped with the current time
    #[must_use]
    pub fn new(
        scope: impl Into<String>,
        query: impl Into<String>,
        answer: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope: scope.into(),
            query: query.into(),
            answer: answer.into(),
            embedding,
            created_at: Utc::now(),
        }
    }
}

/// A search candidate with its cosine similarity to the query vector
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    /// Stored entry
    pub entry: CacheEntry,
    /// Similarity in [-1, 1]; higher is closer
    pub score: f32,
}
