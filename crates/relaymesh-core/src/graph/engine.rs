//! Graph driver
//!
//! One generic `execute` step parameterized by the routed executor; the set
//! of executors is data, not graph structure.

use super::state::{ExecutionState, Stage};
use crate::error::Error;
use crate::gateway::ProviderGateway;
use crate::registry::Registry;
use crate::router::CapabilityRouter;
use relaymesh_cache::SemanticCache;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// A run that reached `Done` with output
#[derive(Debug, Clone)]
pub struct RunSuccess {
    /// Final state (`final_output` and `history` set)
    pub state: ExecutionState,
    /// Output came from the semantic cache
    pub cache_hit: bool,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

/// A run that reached `Done` without output
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct RunFailure {
    /// State at failure; `history` keeps the events recorded so far
    pub state: ExecutionState,
    /// Why the run failed
    #[source]
    pub error: Error,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

/// Outcome of one orchestration run
pub type RunResult = std::result::Result<RunSuccess, RunFailure>;

/// `Start → Routed → Executed → Done` state machine.
///
/// Exactly one executor runs per task. A failure at any stage moves the run
/// straight to `Done` with no partial output and no re-routing.
pub struct OrchestrationGraph {
    registry: Arc<Registry>,
    router: CapabilityRouter,
    gateway: Arc<ProviderGateway>,
    cache: Option<Arc<SemanticCache>>,
}

impl OrchestrationGraph {
    /// Create a graph without a cache
    #[must_use]
    pub fn new(
        registry: Arc<Registry>,
        router: CapabilityRouter,
        gateway: Arc<ProviderGateway>,
    ) -> Self {
        Self {
            registry,
            router,
            gateway,
            cache: None,
        }
    }

    /// Route provider calls through a semantic cache
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<SemanticCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Registry snapshot
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Router
    #[must_use]
    pub fn router(&self) -> &CapabilityRouter {
        &self.router
    }

    /// Provider gateway
    #[must_use]
    pub fn gateway(&self) -> &ProviderGateway {
        &self.gateway
    }

    /// Semantic cache, if enabled
    #[must_use]
    pub fn cache(&self) -> Option<&Arc<SemanticCache>> {
        self.cache.as_ref()
    }

    /// Run one task to completion.
    ///
    /// Cancelling `cancel` stops the run at the next stage boundary or
    /// aborts an in-flight provider call; the run then ends with
    /// [`Error::Cancelled`].
    #[instrument(skip(self, task, cancel), fields(user_id = %user_id))]
    pub async fn run(&self, task: &str, user_id: &str, cancel: &CancellationToken) -> RunResult {
        let started = Instant::now();
        let mut state = ExecutionState::new(task, user_id);
        let mut cache_hit = false;

        debug!(run_id = %state.run_id, "Orchestration run started");

        loop {
            let step = match state.stage() {
                Stage::Start | Stage::Routed if cancel.is_cancelled() => Err(Error::Cancelled),
                Stage::Start => self.route(&mut state),
                Stage::Routed => self.execute(&mut state, cancel).await.map(|hit| {
                    cache_hit = hit;
                }),
                Stage::Executed => {
                    state.finish();
                    Ok(())
                }
                Stage::Done => break,
            };

            if let Err(error) = step {
                let failed_at = state.stage();
                state.finish();
                warn!(
                    run_id = %state.run_id,
                    stage = %failed_at,
                    error = %error,
                    "Orchestration run failed"
                );
                return Err(RunFailure {
                    state,
                    error,
                    duration: started.elapsed(),
                });
            }
        }

        let duration = started.elapsed();
        info!(
            run_id = %state.run_id,
            executor = %state.selected_executor_id,
            cache_hit,
            duration_ms = duration.as_millis() as u64,
            "Orchestration run completed"
        );

        Ok(RunSuccess {
            state,
            cache_hit,
            duration,
        })
    }

    fn route(&self, state: &mut ExecutionState) -> Result<(), Error> {
        let decision = self.router.route(&state.task, &self.registry)?;
        state.mark_routed(&decision.executor_id);
        Ok(())
    }

    /// Returns whether the output was a cache hit.
    async fn execute(
        &self,
        state: &mut ExecutionState,
        cancel: &CancellationToken,
    ) -> Result<bool, Error> {
        let executor = self
            .registry
            .get(&state.selected_executor_id)
            .ok_or_else(|| {
                Error::NoExecutorAvailable(format!(
                    "executor '{}' is not registered",
                    state.selected_executor_id
                ))
            })?;
        let task = state.task.as_str();

        let call = async {
            match &self.cache {
                Some(cache) => cache
                    .get_or_compute_in(&executor.id, task, || self.gateway.call(executor, task))
                    .await
                    .map(|outcome| (outcome.answer, outcome.hit)),
                None => self
                    .gateway
                    .call(executor, task)
                    .await
                    .map(|answer| (answer, false)),
            }
        };

        let (output, hit) = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = call => result?,
        };

        state.mark_executed(output);
        Ok(hit)
    }
}
