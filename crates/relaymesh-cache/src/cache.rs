//! Semantic cache
//!
//! Lookups embed the query and return the stored answer of the nearest entry
//! whose cosine similarity reaches the threshold. Textually different but
//! semantically close queries may therefore share an answer; the threshold
//! bounds how close they must be.
//!
//! Store or embedding failures never fail the caller: `get_or_compute`
//! degrades to calling `compute` directly and logs the bypass.

use crate::entry::CacheEntry;
use crate::error::Result;
use crate::store::VectorStore;
use relaymesh_llm::SharedEmbeddingProvider;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Similarity an entry must reach to count as a hit
pub const DEFAULT_THRESHOLD: f32 = 0.95;

/// Candidates requested per wanted result
pub const DEFAULT_OVERFETCH: usize = 10;

/// Scope used by the unscoped `get`/`set`/`get_or_compute` calls
pub const DEFAULT_SCOPE: &str = "";

/// Cache tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Minimum cosine similarity for a hit (inclusive)
    pub threshold: f32,
    /// Over-fetch factor applied to the search candidate count
    pub overfetch: usize,
    /// Persist misses on a spawned task instead of inline
    pub write_behind: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            overfetch: DEFAULT_OVERFETCH,
            write_behind: false,
        }
    }
}

impl CacheConfig {
    /// Set the hit threshold
    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the over-fetch factor
    #[must_use]
    pub fn with_overfetch(mut self, overfetch: usize) -> Self {
        self.overfetch = overfetch.max(1);
        self
    }

    /// Enable write-behind persistence
    #[must_use]
    pub fn with_write_behind(mut self, write_behind: bool) -> Self {
        self.write_behind = write_behind;
        self
    }
}

/// A cache hit
#[derive(Debug, Clone)]
pub struct CacheHit {
    /// Stored answer
    pub answer: String,
    /// Query the answer was stored under
    pub matched_query: String,
    /// Similarity between the lookup and the stored query
    pub score: f32,
}

/// Result of `get_or_compute`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOutcome {
    /// Answer returned to the caller
    pub answer: String,
    /// Whether the answer came from the cache
    pub hit: bool,
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that fell through to compute
    pub misses: u64,
    /// Lookups that bypassed the cache because it was unavailable
    pub bypassed: u64,
}

/// Similarity-threshold memoization in front of an expensive call.
pub struct SemanticCache {
    store: Arc<dyn VectorStore>,
    embedder: SharedEmbeddingProvider,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    bypassed: AtomicU64,
}

impl SemanticCache {
    /// Create a cache over `store`, embedding with `embedder`.
    ///
    /// Every entry in `store` must have been embedded by the same model as
    /// `embedder`; this is a deployment invariant and is not checked.
    #[must_use]
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: SharedEmbeddingProvider,
        config: CacheConfig,
    ) -> Self {
        info!(
            store = store.name(),
            model = embedder.model(),
            threshold = config.threshold,
            overfetch = config.overfetch,
            "Semantic cache ready"
        );
        Self {
            store,
            embedder,
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            bypassed: AtomicU64::new(0),
        }
    }

    /// Cache configuration
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Backing store name
    #[must_use]
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Counters since construction
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
        }
    }

    /// Number of stored entries
    pub async fn len(&self) -> Result<usize> {
        self.store.len().await
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> Result<bool> {
        self.store.is_empty().await
    }

    /// Look up `query` in the default scope.
    pub async fn get(&self, query: &str) -> Result<Option<CacheHit>> {
        self.get_in(DEFAULT_SCOPE, query).await
    }

    /// Look up `query` within `scope`.
    #[instrument(skip(self, query), fields(scope = %scope))]
    pub async fn get_in(&self, scope: &str, query: &str) -> Result<Option<CacheHit>> {
        let vector = self.embedder.embed(query).await?;
        self.lookup(scope, &vector).await
    }

    /// Store `answer` for `query` in the default scope.
    pub async fn set(&self, query: &str, answer: &str) -> Result<()> {
        self.set_in(DEFAULT_SCOPE, query, answer).await
    }

    /// Store `answer` for `query` within `scope`.
    #[instrument(skip(self, query, answer), fields(scope = %scope))]
    pub async fn set_in(&self, scope: &str, query: &str, answer: &str) -> Result<()> {
        let vector = self.embedder.embed(query).await?;
        self.store
            .insert(CacheEntry::new(scope, query, answer, vector))
            .await
    }

    /// Return a cached answer for `query` or compute, store and return one.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        query: &str,
        compute: F,
    ) -> std::result::Result<CacheOutcome, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<String, E>>,
    {
        self.get_or_compute_in(DEFAULT_SCOPE, query, compute).await
    }

    /// Scoped variant of [`get_or_compute`](Self::get_or_compute).
    ///
    /// `compute` runs exactly once on a miss and not at all on a hit. Its
    /// error is returned unchanged and nothing is stored.
    pub async fn get_or_compute_in<F, Fut, E>(
        &self,
        scope: &str,
        query: &str,
        compute: F,
    ) -> std::result::Result<CacheOutcome, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<String, E>>,
    {
        let vector = match self.embedder.embed(query).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                warn!(error = %e, "Semantic cache unavailable (embedding failed), computing directly");
                self.bypassed.fetch_add(1, Ordering::Relaxed);
                None
            }
        };

        if let Some(vector) = &vector {
            match self.lookup(scope, vector).await {
                Ok(Some(hit)) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(CacheOutcome {
                        answer: hit.answer,
                        hit: true,
                    });
                }
                Ok(None) => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    warn!(error = %e, "Semantic cache unavailable (search failed), computing directly");
                    self.bypassed.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        let answer = compute().await?;

        if let Some(vector) = vector {
            self.persist(CacheEntry::new(scope, query, answer.clone(), vector))
                .await;
        }

        Ok(CacheOutcome { answer, hit: false })
    }

    async fn lookup(&self, scope: &str, vector: &[f32]) -> Result<Option<CacheHit>> {
        let candidates = self.config.overfetch.max(1);
        let best = self
            .store
            .search(vector, scope, candidates)
            .await?
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score));

        match best {
            Some(candidate) if candidate.score >= self.config.threshold => {
                debug!(score = candidate.score, "Semantic cache hit");
                Ok(Some(CacheHit {
                    answer: candidate.entry.answer,
                    matched_query: candidate.entry.query,
                    score: candidate.score,
                }))
            }
            Some(candidate) => {
                debug!(
                    score = candidate.score,
                    threshold = self.config.threshold,
                    "Semantic cache miss (below threshold)"
                );
                Ok(None)
            }
            None => {
                debug!("Semantic cache miss (no candidates)");
                Ok(None)
            }
        }
    }

    /// Store a computed answer. Failures cost a future miss, nothing more.
    async fn persist(&self, entry: CacheEntry) {
        if self.config.write_behind {
            let store = Arc::clone(&self.store);
            tokio::spawn(async move {
                if let Err(e) = store.insert(entry).await {
                    warn!(error = %e, "Failed to persist semantic cache entry");
                }
            });
        } else if let Err(e) = self.store.insert(entry).await {
            warn!(error = %e, "Failed to persist semantic cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ScoredEntry;
    use crate::error::Error;
    use crate::store::InMemoryStore;
    use mockall::mock;
    use relaymesh_llm::MockEmbeddingProvider;
    use std::sync::atomic::AtomicUsize;

    mock! {
        Store {}

        #[async_trait::async_trait]
        impl VectorStore for Store {
            fn name(&self) -> &str;
            async fn search(
                &self,
                query: &[f32],
                scope: &str,
                candidates: usize,
            ) -> Result<Vec<ScoredEntry>>;
            async fn insert(&self, entry: CacheEntry) -> Result<()>;
            async fn len(&self) -> Result<usize>;
        }
    }

    fn cache_with(embedder: Arc<MockEmbeddingProvider>) -> SemanticCache {
        SemanticCache::new(
            Arc::new(InMemoryStore::new()),
            embedder,
            CacheConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_set_then_get_roundtrip() {
        let cache = cache_with(Arc::new(MockEmbeddingProvider::new(64)));
        cache.set("What are AI marketing trends?", "answer").await.unwrap();

        let hit = cache
            .get("What are AI marketing trends?")
            .await
            .unwrap()
            .expect("self-similarity should hit");
        assert_eq!(hit.answer, "answer");
        assert!(hit.score >= DEFAULT_THRESHOLD);
    }

    #[tokio::test]
    async fn test_miss_below_threshold() {
        let cache = cache_with(Arc::new(MockEmbeddingProvider::new(64)));
        cache.set("research marketing trends", "answer").await.unwrap();

        assert!(cache.get("plan my Q1 budget").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_or_compute_miss_computes_once_then_hits() {
        let cache = cache_with(Arc::new(MockEmbeddingProvider::new(64)));
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_compute("summarize the report", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>("summary".to_string())
            })
            .await
            .unwrap();
        assert!(!first.hit);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let second = cache
            .get_or_compute("Summarize the report", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>("different".to_string())
            })
            .await
            .unwrap();
        assert!(second.hit);
        assert_eq!(second.answer, "summary");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_compute_error_is_returned_and_not_cached() {
        let cache = cache_with(Arc::new(MockEmbeddingProvider::new(16)));

        let result = cache
            .get_or_compute("q", || async { Err::<String, _>("provider down") })
            .await;
        assert_eq!(result, Err("provider down"));
        assert!(cache.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_scopes_are_isolated() {
        let cache = cache_with(Arc::new(MockEmbeddingProvider::new(64)));
        cache.set_in("researcher", "ai trends", "research answer").await.unwrap();

        assert!(cache.get_in("strategist", "ai trends").await.unwrap().is_none());
        assert!(cache.get_in("researcher", "ai trends").await.unwrap().is_some());
    }

    #[test]
    fn test_reports_store_and_config() {
        let cache = SemanticCache::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(MockEmbeddingProvider::new(8)),
            CacheConfig::default().with_threshold(0.9),
        );
        assert_eq!(cache.store_name(), "memory");
        assert!((cache.config().threshold - 0.9).abs() < f32::EPSILON);
        assert_eq!(cache.config().overfetch, DEFAULT_OVERFETCH);
    }

    #[tokio::test]
    async fn test_scoped_hit_survives_crowded_neighbours() {
        let cache = cache_with(Arc::new(MockEmbeddingProvider::new(64)));
        for i in 0..DEFAULT_OVERFETCH + 2 {
            cache
                .set_in(&format!("other{i}"), "research ai trends", "other")
                .await
                .unwrap();
        }
        cache
            .set_in("researcher", "research ai trends", "mine")
            .await
            .unwrap();

        let hit = cache
            .get_in("researcher", "research ai trends")
            .await
            .unwrap()
            .map(|hit| hit.answer);
        assert_eq!(hit.as_deref(), Some("mine"));
    }

    #[tokio::test]
    async fn test_strict_threshold_still_hits_identical_query() {
        let store = Arc::new(InMemoryStore::new());
        let embedder = Arc::new(MockEmbeddingProvider::new(64));
        let cache = SemanticCache::new(
            store,
            embedder,
            CacheConfig::default().with_threshold(0.9999),
        );
        cache.set("exact", "a").await.unwrap();
        assert!(cache.get("exact").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_embedding_failure_bypasses_cache() {
        let embedder = Arc::new(MockEmbeddingProvider::new(16));
        let cache = cache_with(Arc::clone(&embedder));
        embedder.set_failing(true);

        let outcome = cache
            .get_or_compute("q", || async { Ok::<_, Error>("fresh".to_string()) })
            .await
            .unwrap();

        assert_eq!(outcome.answer, "fresh");
        assert!(!outcome.hit);
        assert_eq!(cache.stats().bypassed, 1);
        assert!(cache.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_store_failure_bypasses_cache() {
        let mut store = MockStore::new();
        store.expect_name().return_const("mock".to_string());
        store
            .expect_search()
            .times(1)
            .returning(|_, _, _| Err(Error::Store("unreachable".into())));
        store
            .expect_insert()
            .times(1)
            .returning(|_| Err(Error::Store("unreachable".into())));

        let cache = SemanticCache::new(
            Arc::new(store),
            Arc::new(MockEmbeddingProvider::new(16)),
            CacheConfig::default(),
        );

        let outcome = cache
            .get_or_compute("q", || async { Ok::<_, Error>("fresh".to_string()) })
            .await
            .unwrap();
        assert_eq!(outcome.answer, "fresh");
        assert_eq!(cache.stats().bypassed, 1);
    }

    #[tokio::test]
    async fn test_search_requests_overfetched_candidates() {
        let mut store = MockStore::new();
        store.expect_name().return_const("mock".to_string());
        store
            .expect_search()
            .withf(|_, scope, candidates| scope.is_empty() && *candidates == 10)
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));

        let cache = SemanticCache::new(
            Arc::new(store),
            Arc::new(MockEmbeddingProvider::new(16)),
            CacheConfig::default(),
        );
        assert!(cache.get("q").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_behind_eventually_persists() {
        let store = Arc::new(InMemoryStore::new());
        let cache = SemanticCache::new(
            Arc::clone(&store) as Arc<dyn VectorStore>,
            Arc::new(MockEmbeddingProvider::new(16)),
            CacheConfig::default().with_write_behind(true),
        );

        cache
            .get_or_compute("q", || async { Ok::<_, Error>("a".to_string()) })
            .await
            .unwrap();

        for _ in 0..50 {
            if store.len().await.unwrap() == 1 {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("write-behind entry never persisted");
    }

    const CONCURRENT_QUERIES: [&str; 4] = [
        "quarterly revenue forecast",
        "churn analysis for enterprise",
        "launch plan for the mobile app",
        "competitor pricing review",
    ];

    async fn run_concurrent(store: Arc<dyn VectorStore>) {
        const TASKS: usize = 16;
        let cache = Arc::new(SemanticCache::new(
            Arc::clone(&store),
            Arc::new(MockEmbeddingProvider::new(64)),
            CacheConfig::default(),
        ));

        let handles: Vec<_> = (0..TASKS)
            .map(|i| {
                let cache = Arc::clone(&cache);
                let query = CONCURRENT_QUERIES[i % CONCURRENT_QUERIES.len()];
                tokio::spawn(async move {
                    let outcome = cache
                        .get_or_compute_in("researcher", query, || async move {
                            tokio::task::yield_now().await;
                            Ok::<_, Error>(format!("answer: {query}"))
                        })
                        .await
                        .unwrap();
                    (query, outcome)
                })
            })
            .collect();

        for handle in handles {
            let (query, outcome) = handle.await.unwrap();
            assert_eq!(outcome.answer, format!("answer: {query}"));
        }

        let stats = cache.stats();
        assert_eq!(stats.bypassed, 0);
        assert_eq!(stats.hits + stats.misses, TASKS as u64);
        assert!(stats.misses >= CONCURRENT_QUERIES.len() as u64);
        assert_eq!(store.len().await.unwrap() as u64, stats.misses);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_get_or_compute_memory() {
        run_concurrent(Arc::new(InMemoryStore::new())).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_get_or_compute_sqlite() {
        let store = crate::store::SqliteStore::in_memory().await.unwrap();
        run_concurrent(Arc::new(store)).await;
    }
}
