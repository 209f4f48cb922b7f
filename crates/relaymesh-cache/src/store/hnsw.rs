//! Approximate vector store using usearch
//!
//! HNSW search may miss the true nearest neighbour; callers compensate by
//! requesting more candidates than they need.

use super::{rank, VectorStore};
use crate::entry::{CacheEntry, ScoredEntry};
use crate::error::{Error, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use usearch::ffi::{IndexOptions, MetricKind, ScalarKind};

/// Graph connectivity
const CONNECTIVITY: usize = 16;
/// Expansion factor for add operations
const EXPANSION_ADD: usize = 128;
/// Expansion factor for search operations
const EXPANSION_SEARCH: usize = 64;
/// Initial reserved capacity
const INITIAL_CAPACITY: usize = 1_024;

/// In-process HNSW store (cosine metric).
pub struct HnswStore {
    index: usearch::Index,
    entries: RwLock<HashMap<u64, CacheEntry>>,
    insertion_order: RwLock<VecDeque<u64>>,
    next_key: AtomicU64,
    dimensions: usize,
    max_entries: Option<usize>,
}

impl HnswStore {
    /// Create an empty index for `dimensions`-length vectors.
    pub fn new(dimensions: usize) -> Result<Self> {
        let options = IndexOptions {
            dimensions,
            metric: MetricKind::Cos,
            quantization: ScalarKind::F32,
            connectivity: CONNECTIVITY,
            expansion_add: EXPANSION_ADD,
            expansion_search: EXPANSION_SEARCH,
            multi: false,
        };

        let index = usearch::Index::new(&options)
            .map_err(|e| Error::Store(format!("Failed to create index: {e}")))?;
        index
            .reserve(INITIAL_CAPACITY)
            .map_err(|e| Error::Store(format!("Failed to reserve capacity: {e}")))?;

        info!("Created HNSW cache index: {} dims", dimensions);

        Ok(Self {
            index,
            entries: RwLock::new(HashMap::new()),
            insertion_order: RwLock::new(VecDeque::new()),
            next_key: AtomicU64::new(1),
            dimensions,
            max_entries: None,
        })
    }

    /// Evict oldest-first once more than `max_entries` vectors are stored.
    #[must_use]
    pub fn with_capacity_limit(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries.max(1));
        self
    }

    fn check_dimensions(&self, len: usize) -> Result<()> {
        if len != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: len,
            });
        }
        Ok(())
    }

    fn evict_oldest(&self) {
        let Some(max) = self.max_entries else {
            return;
        };
        let mut order = self
            .insertion_order
            .write()
            .unwrap_or_else(|e| e.into_inner());
        while order.len() > max {
            let Some(key) = order.pop_front() else {
                break;
            };
            if let Err(e) = self.index.remove(key) {
                warn!("Failed to remove key {} during eviction: {}", key, e);
            }
            self.entries
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&key);
            debug!(key, "Evicted oldest cache entry");
        }
    }
}

#[async_trait::async_trait]
impl VectorStore for HnswStore {
    fn name(&self) -> &str {
        "hnsw"
    }

    #[instrument(skip(self, query), fields(dims = query.len(), scope = %scope))]
    async fn search(
        &self,
        query: &[f32],
        scope: &str,
        candidates: usize,
    ) -> Result<Vec<ScoredEntry>> {
        self.check_dimensions(query.len())?;
        let size = self.index.size();
        if size == 0 || candidates == 0 {
            return Ok(Vec::new());
        }

        // Widen the ANN query until the scope has enough candidates or the
        // whole index has been visited.
        let mut count = candidates.min(size);
        loop {
            let matches = self
                .index
                .search(query, count)
                .map_err(|e| Error::Store(format!("Search failed: {e}")))?;

            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            let scored: Vec<ScoredEntry> = matches
                .keys
                .iter()
                .zip(matches.distances.iter())
                .filter_map(|(key, distance)| {
                    entries
                        .get(key)
                        .filter(|entry| entry.scope == scope)
                        .map(|entry| ScoredEntry {
                            entry: entry.clone(),
                            // cosine distance -> similarity
                            score: 1.0 - distance,
                        })
                })
                .collect();

            if scored.len() >= candidates || count >= size {
                return Ok(rank(scored, candidates));
            }
            count = count.saturating_mul(2).min(size);
        }
    }

    #[instrument(skip(self, entry), fields(id = %entry.id))]
    async fn insert(&self, entry: CacheEntry) -> Result<()> {
        self.check_dimensions(entry.embedding.len())?;

        let key = self.next_key.fetch_add(1, Ordering::SeqCst);

        if self.index.size() >= self.index.capacity() {
            let new_cap = std::cmp::max(self.index.capacity() * 2, 64);
            self.index
                .reserve(new_cap)
                .map_err(|e| Error::Store(format!("Failed to expand capacity: {e}")))?;
        }

        self.index
            .add(key, &entry.embedding)
            .map_err(|e| Error::Store(format!("Failed to add vector: {e}")))?;

        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, entry);
        self.insertion_order
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(key);

        self.evict_oldest();
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().unwrap_or_else(|e| e.into_inner()).len())
    }
}
