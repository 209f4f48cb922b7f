//! Provider and cache construction
//!
//! Registers a provider per family whose API key is present and builds the
//! semantic cache selected by `[cache]` and the knowledge base selected by
//! `[knowledge]`.

use super::config::{AppConfig, CacheBackend, LlmConfig};
use std::path::Path;
use anyhow::{Context, Result};
use relaymesh_cache::{
    CacheConfig, InMemoryStore, KnowledgeBase, SemanticCache, SqliteStore, VectorStore,
};
use relaymesh_core::ProviderGateway;
use relaymesh_llm::{
    GeminiConfig, GeminiProvider, OpenAiConfig, OpenAiEmbeddingConfig, OpenAiEmbeddingProvider,
    OpenAiProvider, ProviderFamily,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Build the provider gateway from environment credentials
pub fn build_gateway(llm_config: &LlmConfig) -> ProviderGateway {
    let timeout = Duration::from_secs(llm_config.timeout_secs);
    let mut gateway = ProviderGateway::new()
        .with_timeout(timeout)
        .with_fallback_model(&llm_config.fallback_model);

    match OpenAiConfig::from_env().and_then(|c| OpenAiProvider::new(c.with_timeout(timeout))) {
        Ok(provider) => {
            gateway.register(ProviderFamily::OpenAi, Arc::new(provider));
            info!("Registered OpenAI provider");
        }
        Err(e) => debug!("OpenAI provider not available: {}", e),
    }

    match GeminiConfig::from_env().and_then(|c| GeminiProvider::new(c.with_timeout(timeout))) {
        Ok(provider) => {
            gateway.register(ProviderFamily::Gemini, Arc::new(provider));
            info!("Registered Gemini provider");
        }
        Err(e) => debug!("Gemini provider not available: {}", e),
    }

    if let Some(warning) = coverage_warning(&gateway) {
        warn!("{}", warning);
    }

    gateway
}

/// Describe which runs will fail with the registered providers
fn coverage_warning(gateway: &ProviderGateway) -> Option<&'static str> {
    if gateway.families().is_empty() {
        Some("No provider API keys found (OPENAI_API_KEY, GEMINI_API_KEY); every run will fail")
    } else if !gateway.has_provider(ProviderFamily::OpenAi) {
        Some("No OpenAI provider (OPENAI_API_KEY); executors without a Gemini model will fail")
    } else {
        None
    }
}

/// Build the semantic cache, or `None` when disabled or unavailable.
///
/// A cache that cannot be built is logged and skipped; the orchestrator
/// then calls providers directly.
pub async fn build_cache(config: &AppConfig) -> Option<Arc<SemanticCache>> {
    let cache = &config.cache;
    if !cache.enabled {
        info!("Semantic cache disabled");
        return None;
    }

    let embedder = match OpenAiEmbeddingConfig::from_env()
        .map(|c| c.with_model(&cache.embedding_model, cache.dimensions))
        .and_then(OpenAiEmbeddingProvider::new)
    {
        Ok(embedder) => Arc::new(embedder),
        Err(e) => {
            warn!("Semantic cache disabled: no embedding provider ({})", e);
            return None;
        }
    };

    let store = match open_store(
        cache.backend,
        &config.cache_path(),
        cache.dimensions,
        cache.max_entries,
    )
    .await
    {
        Ok(store) => store,
        Err(e) => {
            let e = relaymesh_core::Error::from(e);
            warn!("Semantic cache disabled: {}", e);
            return None;
        }
    };

    let cache_config = CacheConfig::default()
        .with_threshold(cache.threshold)
        .with_overfetch(cache.overfetch)
        .with_write_behind(cache.write_behind);

    Some(Arc::new(SemanticCache::new(store, embedder, cache_config)))
}

/// Build the knowledge base, or `None` when disabled or unavailable.
pub async fn build_knowledge(config: &AppConfig) -> Option<Arc<KnowledgeBase>> {
    let knowledge = &config.knowledge;
    if !knowledge.enabled {
        info!("Knowledge search disabled");
        return None;
    }

    let embedder = match OpenAiEmbeddingConfig::from_env()
        .map(|c| c.with_model(&knowledge.embedding_model, knowledge.dimensions))
        .and_then(OpenAiEmbeddingProvider::new)
    {
        Ok(embedder) => Arc::new(embedder),
        Err(e) => {
            warn!("Knowledge search disabled: no embedding provider ({})", e);
            return None;
        }
    };

    match open_store(
        knowledge.backend,
        &config.knowledge_path(),
        knowledge.dimensions,
        0,
    )
    .await
    {
        Ok(store) => Some(Arc::new(
            KnowledgeBase::new(store, embedder).with_overfetch(knowledge.overfetch),
        )),
        Err(e) => {
            warn!("Knowledge search disabled: {}", e);
            None
        }
    }
}

/// Open a vector store; `max_entries` 0 means unbounded
async fn open_store(
    backend: CacheBackend,
    path: &Path,
    dimensions: usize,
    max_entries: usize,
) -> relaymesh_cache::Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match backend {
        CacheBackend::Memory => Arc::new(if max_entries > 0 {
            InMemoryStore::with_capacity_limit(max_entries)
        } else {
            InMemoryStore::new()
        }),
        CacheBackend::Sqlite => {
            let mut store = SqliteStore::from_path(path).await?;
            if max_entries > 0 {
                store = store.with_capacity_limit(max_entries);
            }
            Arc::new(store)
        }
        CacheBackend::Hnsw => open_hnsw(dimensions, max_entries)?,
    };

    Ok(store)
}

#[cfg(feature = "hnsw")]
fn open_hnsw(
    dimensions: usize,
    max_entries: usize,
) -> relaymesh_cache::Result<Arc<dyn VectorStore>> {
    let mut store = relaymesh_cache::HnswStore::new(dimensions)?;
    if max_entries > 0 {
        store = store.with_capacity_limit(max_entries);
    }
    Ok(Arc::new(store))
}

#[cfg(not(feature = "hnsw"))]
fn open_hnsw(
    _dimensions: usize,
    _max_entries: usize,
) -> relaymesh_cache::Result<Arc<dyn VectorStore>> {
    Err(relaymesh_cache::Error::Store(
        "hnsw backend requires building with `--features hnsw`".to_string(),
    ))
}

/// Resolve the configured data directory, creating it if needed
pub fn ensure_data_dir(config: &AppConfig) -> Result<()> {
    let dir = config.data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaymesh_llm::MockProvider;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_memory_store() {
        let config = AppConfig::default();
        let store = open_store(CacheBackend::Memory, &config.cache_path(), 8, 0)
            .await
            .unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[tokio::test]
    async fn test_open_sqlite_stores_under_data_dir() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig {
            data_dir: Some(dir.path().to_string_lossy().to_string()),
            ..Default::default()
        };

        let cache = open_store(CacheBackend::Sqlite, &config.cache_path(), 8, 0)
            .await
            .unwrap();
        let knowledge = open_store(CacheBackend::Sqlite, &config.knowledge_path(), 8, 0)
            .await
            .unwrap();
        assert!(cache.is_empty().await.unwrap());
        assert!(knowledge.is_empty().await.unwrap());
        assert!(dir.path().join("semantic_cache.db").exists());
        assert!(dir.path().join("knowledge.db").exists());
    }

    #[test]
    fn test_coverage_warning() {
        assert!(coverage_warning(&ProviderGateway::new())
            .unwrap()
            .contains("every run will fail"));

        let gemini_only = ProviderGateway::new()
            .with_provider(ProviderFamily::Gemini, Arc::new(MockProvider::new()));
        assert!(coverage_warning(&gemini_only)
            .unwrap()
            .contains("No OpenAI provider"));

        let openai = ProviderGateway::new()
            .with_provider(ProviderFamily::OpenAi, Arc::new(MockProvider::new()));
        assert_eq!(coverage_warning(&openai), None);
    }

    #[tokio::test]
    async fn test_disabled_knowledge_is_none() {
        let mut config = AppConfig::default();
        config.knowledge.enabled = false;
        assert!(build_knowledge(&config).await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_cache_is_none() {
        let mut config = AppConfig::default();
        config.cache.enabled = false;
        assert!(build_cache(&config).await.is_none());
    }
}
