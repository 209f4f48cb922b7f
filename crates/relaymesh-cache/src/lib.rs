//! Relaymesh Cache - semantic memoization of provider answers
//!
//! This crate puts an embedding-similarity cache in front of expensive
//! calls:
//! - `SemanticCache` embeds a query and returns a stored answer when a
//!   previous query is similar enough
//! - `KnowledgeBase` embeds documents and returns the closest ones for a
//!   query
//! - `VectorStore` implementations hold the entries (in-memory, SQLite,
//!   or usearch HNSW behind the `hnsw` feature)
//!
//! Cache failures degrade to calling the wrapped computation directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod entry;
pub mod error;
pub mod knowledge;
pub mod similarity;
pub mod store;

pub use cache::{
    CacheConfig, CacheHit, CacheOutcome, CacheStats, SemanticCache, DEFAULT_OVERFETCH,
    DEFAULT_SCOPE, DEFAULT_THRESHOLD,
};
pub use entry::{CacheEntry, ScoredEntry};
pub use error::{Error, Result};
pub use knowledge::{
    KnowledgeBase, SearchResult, DEFAULT_SEARCH_LIMIT, KNOWLEDGE_SCOPE, UNKNOWN_SOURCE,
};
pub use similarity::cosine_similarity;
pub use store::{InMemoryStore, SqliteStore, VectorStore};

#[cfg(feature = "hnsw")]
pub use store::HnswStore;

use std::path::PathBuf;

/// Default location of the persisted cache database
#[must_use]
pub fn default_cache_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".relaymesh")
        .join("semantic_cache.db")
}
