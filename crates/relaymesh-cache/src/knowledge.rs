//! Knowledge base retrieval
//!
//! Documents are embedded once on ingest and searched by cosine similarity.
//! A search asks the store for `limit * overfetch` candidates and keeps the
//! best `limit`, mirroring the recall margin the semantic cache uses.
//!
//! Documents reuse [`CacheEntry`]: `query` holds the document text and
//! `answer` holds its source label, all under [`KNOWLEDGE_SCOPE`].

use crate::cache::DEFAULT_OVERFETCH;
use crate::entry::CacheEntry;
use crate::error::{Error, Result};
use crate::store::VectorStore;
use relaymesh_llm::SharedEmbeddingProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Scope every knowledge document is stored under
pub const KNOWLEDGE_SCOPE: &str = "knowledge";

/// Results returned when the caller does not ask for a count
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Source label for documents ingested without one
pub const UNKNOWN_SOURCE: &str = "unknown";

/// One retrieved document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Document text
    pub content: String,
    /// Where the document came from
    pub source: String,
    /// Cosine similarity to the query
    pub score: f32,
}

/// Embedding-backed document search
pub struct KnowledgeBase {
    store: Arc<dyn VectorStore>,
    embedder: SharedEmbeddingProvider,
    overfetch: usize,
}

impl KnowledgeBase {
    /// Create a knowledge base over `store`
    #[must_use]
    pub fn new(store: Arc<dyn VectorStore>, embedder: SharedEmbeddingProvider) -> Self {
        info!(
            store = store.name(),
            model = embedder.model(),
            "Knowledge base ready"
        );
        Self {
            store,
            embedder,
            overfetch: DEFAULT_OVERFETCH,
        }
    }

    /// Set the candidate over-fetch factor (minimum 1)
    #[must_use]
    pub fn with_overfetch(mut self, overfetch: usize) -> Self {
        self.overfetch = overfetch.max(1);
        self
    }

    /// Backing store name
    #[must_use]
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Number of stored documents
    pub async fn len(&self) -> Result<usize> {
        self.store.len().await
    }

    /// Whether no documents are stored
    pub async fn is_empty(&self) -> Result<bool> {
        self.store.is_empty().await
    }

    /// Embed and store a document.
    ///
    /// # Errors
    /// [`Error::InvalidInput`] for blank content, otherwise embedding or
    /// store failures.
    #[instrument(skip(self, content))]
    pub async fn add(&self, content: &str, source: Option<&str>) -> Result<Uuid> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::InvalidInput(
                "document content must not be empty".to_string(),
            ));
        }

        let source = source
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SOURCE);
        let vector = self.embedder.embed(content).await?;
        let entry = CacheEntry::new(KNOWLEDGE_SCOPE, content, source, vector);
        let id = entry.id;
        self.store.insert(entry).await?;

        debug!(%id, "Knowledge document stored");
        Ok(id)
    }

    /// Return up to `limit` documents ordered by descending similarity.
    ///
    /// # Errors
    /// Embedding or store failures.
    #[instrument(skip(self, query))]
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(query).await?;
        let candidates = limit.saturating_mul(self.overfetch);
        let results: Vec<SearchResult> = self
            .store
            .search(&vector, KNOWLEDGE_SCOPE, candidates)
            .await?
            .into_iter()
            .take(limit)
            .map(|scored| SearchResult {
                content: scored.entry.query,
                source: scored.entry.answer,
                score: scored.score,
            })
            .collect();

        debug!(candidates, returned = results.len(), "Knowledge search complete");
        Ok(results)
    }
}
