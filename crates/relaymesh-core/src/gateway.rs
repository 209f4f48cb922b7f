//! Provider Gateway
//!
//! Turns an executor plus a task into one provider call. The gateway picks
//! the provider family from the executor's model parameters, applies a
//! bounded timeout, and maps every failure to
//! [`Error::ProviderUnavailable`]. It never retries; retry policy belongs
//! to the caller.

use crate::error::{Error, Result};
use crate::registry::ExecutorDefinition;
use relaymesh_llm::{LlmProvider, ProviderFamily, FALLBACK_MODEL};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default per-call provider timeout
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(120);

/// Dispatches executor calls to registered providers
pub struct ProviderGateway {
    providers: HashMap<ProviderFamily, Arc<dyn LlmProvider>>,
    timeout: Duration,
    fallback_model: String,
}

impl ProviderGateway {
    /// Create a gateway with no providers
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
            fallback_model: FALLBACK_MODEL.to_string(),
        }
    }

    /// Set the per-call timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the model used when an executor's model is not recognized
    #[must_use]
    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = model.into();
        self
    }

    /// Register the provider serving a family
    #[must_use]
    pub fn with_provider(mut self, family: ProviderFamily, provider: Arc<dyn LlmProvider>) -> Self {
        self.register(family, provider);
        self
    }

    /// Register the provider serving a family
    pub fn register(&mut self, family: ProviderFamily, provider: Arc<dyn LlmProvider>) {
        debug!(family = family.as_str(), provider = provider.name(), "Registering provider");
        self.providers.insert(family, provider);
    }

    /// Check if a family has a provider
    #[must_use]
    pub fn has_provider(&self, family: ProviderFamily) -> bool {
        self.providers.contains_key(&family)
    }

    /// List registered families
    #[must_use]
    pub fn families(&self) -> Vec<ProviderFamily> {
        let mut families: Vec<_> = self.providers.keys().copied().collect();
        families.sort_by_key(|f| f.as_str());
        families
    }

    /// Per-call timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `task` through `executor` and return the provider's text.
    ///
    /// # Errors
    /// [`Error::ProviderUnavailable`] on a missing provider, timeout,
    /// transport failure or malformed response.
    #[instrument(skip(self, executor, task), fields(executor = %executor.id))]
    pub async fn call(&self, executor: &ExecutorDefinition, task: &str) -> Result<String> {
        let unavailable = |source: relaymesh_llm::Error| Error::ProviderUnavailable {
            executor: executor.id.clone(),
            source,
        };

        let selection = executor.model_parameters.selection(&self.fallback_model);
        let provider = self.providers.get(&selection.family).ok_or_else(|| {
            unavailable(relaymesh_llm::Error::NotConfigured(format!(
                "no {} provider registered",
                selection.family
            )))
        })?;

        debug!(
            provider = provider.name(),
            model = %selection.model,
            reasoning_effort = ?selection.reasoning_effort,
            verbosity = ?selection.verbosity,
            "Calling provider"
        );

        let request = selection.to_request(executor.build_prompt(task));
        let response = match tokio::time::timeout(self.timeout, provider.complete(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(error = %e, transport = e.is_transport(), "Provider call failed");
                return Err(unavailable(e));
            }
            Err(_) => {
                let ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(timeout_ms = ms, "Provider call timed out");
                return Err(unavailable(relaymesh_llm::Error::Timeout(ms)));
            }
        };

        if response.content.trim().is_empty() {
            return Err(unavailable(relaymesh_llm::Error::InvalidResponse(
                "empty completion".to_string(),
            )));
        }

        Ok(response.content)
    }
}

impl Default for ProviderGateway {
    fn default() -> Self {
        Self::new()
    }
}
