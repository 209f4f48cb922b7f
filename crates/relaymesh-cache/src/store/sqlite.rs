//! SqliteStore: persistent exact vector store.
//!
//! Table: `semantic_cache`. Embeddings are stored as little-endian `f32`
//! blobs; search loads rows of matching dimension and ranks them in process.

use super::{rank, VectorStore};
use crate::entry::{CacheEntry, ScoredEntry};
use crate::error::{Error, Result};
use crate::similarity::cosine_similarity;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// SQLite-backed cache store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    max_entries: Option<usize>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    pub async fn from_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let url = format!("sqlite:{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        // WAL lets lookups proceed while a miss is being written
        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;

        let store = Self {
            pool,
            max_entries: None,
        };
        store.run_migrations().await?;
        info!("Semantic cache store initialized at {}", db_path.display());
        Ok(store)
    }

    /// In-memory store (for tests).
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self {
            pool,
            max_entries: None,
        };
        store.run_migrations().await?;
        debug!("In-memory semantic cache store initialized");
        Ok(store)
    }

    /// Evict oldest-first once more than `max_entries` rows are stored.
    #[must_use]
    pub fn with_capacity_limit(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries.max(1));
        self
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS semantic_cache (
                id          TEXT PRIMARY KEY,
                scope       TEXT NOT NULL,
                query       TEXT NOT NULL,
                answer      TEXT NOT NULL,
                embedding   BLOB NOT NULL,
                dimensions  INTEGER NOT NULL,
                created_at  TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_semantic_cache_scope_dims
             ON semantic_cache(scope, dimensions)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_semantic_cache_created
             ON semantic_cache(created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn evict_overflow(&self, max: usize) -> Result<()> {
        let max = i64::try_from(max).unwrap_or(i64::MAX);
        let result = sqlx::query(
            "DELETE FROM semantic_cache WHERE id IN (
                SELECT id FROM semantic_cache
                ORDER BY created_at ASC, rowid ASC
                LIMIT (SELECT MAX(COUNT(*) - ?1, 0) FROM semantic_cache)
            )",
        )
        .bind(max)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            debug!(evicted = result.rows_affected(), "Evicted oldest cache entries");
        }
        Ok(())
    }
}

fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(Error::Serialization(format!(
            "embedding blob length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn row_to_entry(row: &SqliteRow) -> Result<CacheEntry> {
    let id: String = row.try_get("id")?;
    let created_at: String = row.try_get("created_at")?;
    let embedding: Vec<u8> = row.try_get("embedding")?;

    Ok(CacheEntry {
        id: Uuid::parse_str(&id).map_err(|e| Error::Serialization(format!("id: {e}")))?,
        scope: row.try_get("scope")?,
        query: row.try_get("query")?,
        answer: row.try_get("answer")?,
        embedding: decode_embedding(&embedding)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| Error::Serialization(format!("created_at: {e}")))?
            .with_timezone(&Utc),
    })
}

#[async_trait::async_trait]
impl VectorStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    #[instrument(skip(self, query), fields(dims = query.len(), scope = %scope))]
    async fn search(
        &self,
        query: &[f32],
        scope: &str,
        candidates: usize,
    ) -> Result<Vec<ScoredEntry>> {
        let dims = i64::try_from(query.len()).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            "SELECT id, scope, query, answer, embedding, created_at
             FROM semantic_cache WHERE scope = ?1 AND dimensions = ?2",
        )
        .bind(scope)
        .bind(dims)
        .fetch_all(&self.pool)
        .await?;

        let mut scored = Vec::with_capacity(rows.len());
        for row in &rows {
            let entry = row_to_entry(row)?;
            scored.push(ScoredEntry {
                score: cosine_similarity(query, &entry.embedding),
                entry,
            });
        }
        Ok(rank(scored, candidates))
    }

    #[instrument(skip(self, entry), fields(id = %entry.id, scope = %entry.scope))]
    async fn insert(&self, entry: CacheEntry) -> Result<()> {
        let dims = i64::try_from(entry.embedding.len()).unwrap_or(i64::MAX);
        sqlx::query(
            "INSERT OR REPLACE INTO semantic_cache
             (id, scope, query, answer, embedding, dimensions, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(entry.id.to_string())
        .bind(&entry.scope)
        .bind(&entry.query)
        .bind(&entry.answer)
        .bind(encode_embedding(&entry.embedding))
        .bind(dims)
        .bind(entry.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await?;

        if let Some(max) = self.max_entries {
            self.evict_overflow(max).await?;
        }
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM semantic_cache")
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
