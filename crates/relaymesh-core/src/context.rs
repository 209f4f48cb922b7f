//! Engine context
//!
//! Everything a request handler needs, built once at startup and shared as
//! `Arc<EngineContext>`. Nothing in it is mutated after construction.

use crate::analysis::{compose_analysis_task, Analysis};
use crate::error::{Error, Result};
use crate::gateway::ProviderGateway;
use crate::graph::{OrchestrationGraph, RunResult};
use crate::registry::{Registry, RegistryLoader};
use crate::router::CapabilityRouter;
use relaymesh_cache::{KnowledgeBase, SemanticCache};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

/// Outcome of the startup registry load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryStatus {
    /// Registry directory was read
    Loaded,
    /// Registry directory could not be read
    Unavailable(String),
}

/// Orchestrator readiness as reported by `/health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BrainState {
    /// Loaded with at least one executor
    Active,
    /// Loaded, but no executors
    Initializing,
    /// Registry source unavailable
    Unavailable,
}

/// Point-in-time health
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    /// Orchestrator readiness
    pub brain: BrainState,
    /// Executor ids in load order
    pub executors: Vec<String>,
    /// Registry load error, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_error: Option<String>,
    /// Whether the semantic cache is enabled
    pub cache_enabled: bool,
    /// Backing store of the semantic cache
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_store: Option<String>,
    /// Whether knowledge search is enabled
    pub knowledge_enabled: bool,
}

impl HealthSnapshot {
    /// Ready to receive traffic
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.brain == BrainState::Active
    }
}

/// Immutable per-process engine
pub struct EngineContext {
    graph: OrchestrationGraph,
    registry_status: RegistryStatus,
    knowledge: Option<Arc<KnowledgeBase>>,
}

impl EngineContext {
    /// Build from an already-loaded registry
    #[must_use]
    pub fn new(
        registry: Registry,
        router: CapabilityRouter,
        gateway: ProviderGateway,
        cache: Option<Arc<SemanticCache>>,
    ) -> Self {
        Self::assemble(Ok(registry), router, gateway, cache)
    }

    /// Load the registry from `path` and build the context.
    ///
    /// An unreadable registry does not fail construction: the context comes
    /// up empty and reports itself unhealthy so the process stays observable.
    #[must_use]
    pub fn load(
        path: impl AsRef<Path>,
        router: CapabilityRouter,
        gateway: ProviderGateway,
        cache: Option<Arc<SemanticCache>>,
    ) -> Self {
        let loaded = RegistryLoader::with_path(path.as_ref()).load();
        Self::assemble(loaded, router, gateway, cache)
    }

    fn assemble(
        loaded: Result<Registry>,
        router: CapabilityRouter,
        gateway: ProviderGateway,
        cache: Option<Arc<SemanticCache>>,
    ) -> Self {
        let (registry, registry_status) = match loaded {
            Ok(registry) => (registry, RegistryStatus::Loaded),
            Err(e) => {
                error!(error = %e, "Executor registry unavailable, serving as unhealthy");
                (Registry::empty(), RegistryStatus::Unavailable(e.to_string()))
            }
        };

        info!(
            executors = registry.len(),
            default_executor = router.default_executor().unwrap_or("<declared>"),
            providers = ?gateway.families(),
            cache = cache.as_ref().map(|c| c.store_name()),
            cache_threshold = cache.as_ref().map(|c| c.config().threshold),
            "Engine context ready"
        );

        let mut graph = OrchestrationGraph::new(Arc::new(registry), router, Arc::new(gateway));
        if let Some(cache) = cache {
            graph = graph.with_cache(cache);
        }

        Self {
            graph,
            registry_status,
            knowledge: None,
        }
    }

    /// Serve knowledge search from `knowledge`
    #[must_use]
    pub fn with_knowledge(mut self, knowledge: Arc<KnowledgeBase>) -> Self {
        info!(store = knowledge.store_name(), "Knowledge search enabled");
        self.knowledge = Some(knowledge);
        self
    }

    /// Knowledge base, if enabled
    #[must_use]
    pub fn knowledge(&self) -> Option<&Arc<KnowledgeBase>> {
        self.knowledge.as_ref()
    }

    /// Registry snapshot
    #[must_use]
    pub fn registry(&self) -> &Registry {
        self.graph.registry()
    }

    /// Registry load status
    #[must_use]
    pub fn registry_status(&self) -> &RegistryStatus {
        &self.registry_status
    }

    /// Orchestration graph
    #[must_use]
    pub fn graph(&self) -> &OrchestrationGraph {
        &self.graph
    }

    /// Run one task through the graph.
    ///
    /// An unavailable or empty registry fails every run with
    /// [`Error::NoExecutorAvailable`].
    pub async fn run(&self, task: &str, user_id: &str, cancel: &CancellationToken) -> RunResult {
        self.graph.run(task, user_id, cancel).await
    }

    /// Synthesize a strategy for `task` from research `findings`.
    ///
    /// The default executor handles every analysis; capability routing is
    /// not consulted. Nothing is cached.
    ///
    /// # Errors
    /// [`Error::NoExecutorAvailable`] without a default executor,
    /// [`Error::ProviderUnavailable`] on provider failure and
    /// [`Error::Cancelled`] when `cancel` fires first.
    #[instrument(skip(self, task, findings, cancel), fields(findings = findings.len()))]
    pub async fn analyze(
        &self,
        task: &str,
        findings: &[String],
        cancel: &CancellationToken,
    ) -> Result<Analysis> {
        let started = Instant::now();
        let executor = self.graph.router().fallback(self.registry())?;
        let prompt = compose_analysis_task(task, findings);

        let strategy = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = self.graph.gateway().call(executor, &prompt) => result?,
        };

        let duration = started.elapsed();
        info!(
            executor = %executor.id,
            duration_ms = duration.as_millis() as u64,
            "Analysis completed"
        );
        Ok(Analysis {
            executor_id: executor.id.clone(),
            strategy,
            duration,
        })
    }

    /// Health snapshot
    #[must_use]
    pub fn health(&self) -> HealthSnapshot {
        let registry = self.registry();
        let (brain, registry_error) = match &self.registry_status {
            RegistryStatus::Unavailable(msg) => (BrainState::Unavailable, Some(msg.clone())),
            RegistryStatus::Loaded if registry.is_empty() => (BrainState::Initializing, None),
            RegistryStatus::Loaded => (BrainState::Active, None),
        };

        HealthSnapshot {
            brain,
            executors: registry.ids().map(str::to_string).collect(),
            registry_error,
            cache_enabled: self.graph.cache().is_some(),
            cache_store: self.graph.cache().map(|c| c.store_name().to_string()),
            knowledge_enabled: self.knowledge.is_some(),
        }
    }

    /// Fail fast when the context cannot serve any request
    ///
    /// # Errors
    /// [`Error::Configuration`] when the registry is unavailable or empty
    pub fn ensure_ready(&self) -> Result<()> {
        match self.health().brain {
            BrainState::Active => Ok(()),
            BrainState::Initializing => Err(Error::Configuration(
                "executor registry is empty".to_string(),
            )),
            BrainState::Unavailable => Err(Error::Configuration(format!(
                "executor registry unavailable: {}",
                self.health().registry_error.unwrap_or_default()
            ))),
        }
    }
}
