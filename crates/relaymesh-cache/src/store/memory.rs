//! Exact in-process vector store

use super::{rank, VectorStore};
use crate::entry::{CacheEntry, ScoredEntry};
use crate::error::Result;
use crate::similarity::cosine_similarity;
use std::collections::VecDeque;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory store with an optional capacity bound.
///
/// Without a bound the store grows without limit. With one, the oldest entry
/// is evicted once the bound is exceeded.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<VecDeque<CacheEntry>>,
    max_entries: Option<usize>,
}

impl InMemoryStore {
    /// Create an unbounded store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store evicting oldest-first beyond `max_entries`
    #[must_use]
    pub fn with_capacity_limit(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            max_entries: Some(max_entries.max(1)),
        }
    }
}

#[async_trait::async_trait]
impl VectorStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn search(
        &self,
        query: &[f32],
        scope: &str,
        candidates: usize,
    ) -> Result<Vec<ScoredEntry>> {
        let entries = self.entries.read().await;
        let scored = entries
            .iter()
            .filter(|e| e.scope == scope && e.embedding.len() == query.len())
            .map(|e| ScoredEntry {
                score: cosine_similarity(query, &e.embedding),
                entry: e.clone(),
            })
            .collect();
        Ok(rank(scored, candidates))
    }

    async fn insert(&self, entry: CacheEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.push_back(entry);
        if let Some(max) = self.max_entries {
            while entries.len() > max {
                if let Some(evicted) = entries.pop_front() {
                    debug!(id = %evicted.id, "Evicted oldest cache entry");
                }
            }
        }
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}
