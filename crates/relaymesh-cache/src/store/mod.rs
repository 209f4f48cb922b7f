//! Vector stores behind the semantic cache
//!
//! A store is the `search(queryVector, candidateCount)` boundary: it returns
//! up to `candidates` entries of one scope ordered by descending cosine
//! similarity. Exact stores scan every entry of the scope; the HNSW store is
//! approximate, which is why callers over-fetch.
//!
//! # Module Structure
//!
//! - `memory`: exact in-process store
//! - `sqlite`: exact store persisted with sqlx
//! - `hnsw`: approximate usearch store (feature `hnsw`)

mod memory;
mod sqlite;

#[cfg(feature = "hnsw")]
mod hnsw;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

#[cfg(feature = "hnsw")]
pub use hnsw::HnswStore;

use crate::entry::{CacheEntry, ScoredEntry};
use crate::error::Result;

/// Storage and nearest-neighbour search for cache entries.
///
/// Implementations must tolerate concurrent `search` and `insert` calls.
/// Colliding near-duplicate inserts may both be kept; no transactional
/// guarantee is required.
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Store name (for logs and health output)
    fn name(&self) -> &str;

    /// Return up to `candidates` entries of `scope` ordered by descending
    /// similarity.
    ///
    /// Entries of other scopes never take a candidate slot.
    async fn search(
        &self,
        query: &[f32],
        scope: &str,
        candidates: usize,
    ) -> Result<Vec<ScoredEntry>>;

    /// Persist an entry.
    async fn insert(&self, entry: CacheEntry) -> Result<()>;

    /// Number of stored entries.
    async fn len(&self) -> Result<usize>;

    /// Whether the store holds no entries.
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

/// Sort by descending score and keep the top `candidates`.
pub(crate) fn rank(mut scored: Vec<ScoredEntry>, candidates: usize) -> Vec<ScoredEntry> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(candidates);
    scored
}
