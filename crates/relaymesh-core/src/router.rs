//! Capability Router
//!
//! First-match substring routing: the lowercased task is tested against each
//! executor's capability tag in registry order and the first contained tag
//! wins. There is no scoring, and a longer or more specific tag never beats
//! an earlier one.

use crate::error::{Error, Result};
use crate::registry::{ExecutorDefinition, Registry};
use tracing::{debug, info};

/// How the executor was chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteReason {
    /// Capability tag found in the task
    Matched {
        /// The matching tag
        tag: String,
    },
    /// No tag matched; the default executor was used
    Fallback,
}

/// Routing decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    /// Selected executor id
    pub executor_id: String,
    /// Why it was selected
    pub reason: RouteReason,
}

/// Selects exactly one executor per task
#[derive(Debug, Clone, Default)]
pub struct CapabilityRouter {
    default_executor: Option<String>,
}

impl CapabilityRouter {
    /// Create a router with no configured default.
    ///
    /// Fallback then uses the executor that declares `default: true`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configured default executor id (blank means none)
    #[must_use]
    pub fn with_default_executor(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.default_executor = (!id.trim().is_empty()).then(|| id.trim().to_string());
        self
    }

    /// Configured default executor id
    #[must_use]
    pub fn default_executor(&self) -> Option<&str> {
        self.default_executor.as_deref()
    }

    /// Select an executor for `task`.
    ///
    /// # Errors
    /// [`Error::NoExecutorAvailable`] when the registry is empty, or when
    /// nothing matches and the default is missing from the registry.
    pub fn route(&self, task: &str, registry: &Registry) -> Result<RouteDecision> {
        if registry.is_empty() {
            return Err(Error::NoExecutorAvailable(
                "executor registry is empty".to_string(),
            ));
        }

        let task = task.to_lowercase();
        if let Some(executor) = registry.iter().find(|e| e.matches(&task)) {
            debug!(executor = %executor.id, tag = %executor.capability_tag, "Capability match");
            return Ok(RouteDecision {
                executor_id: executor.id.clone(),
                reason: RouteReason::Matched {
                    tag: executor.capability_tag.clone(),
                },
            });
        }

        let fallback = self.fallback(registry)?.id.clone();
        info!(executor = %fallback, "No capability matched, using default executor");
        Ok(RouteDecision {
            executor_id: fallback,
            reason: RouteReason::Fallback,
        })
    }

    /// Resolve the default executor: the configured id, else the executor
    /// declaring `default: true`.
    ///
    /// # Errors
    /// [`Error::NoExecutorAvailable`] when neither is registered.
    pub fn fallback<'r>(&self, registry: &'r Registry) -> Result<&'r ExecutorDefinition> {
        match &self.default_executor {
            Some(id) => registry.get(id).ok_or_else(|| {
                Error::NoExecutorAvailable(format!(
                    "no capability matched and default executor '{}' is not registered",
                    id
                ))
            }),
            None => registry.declared_default().ok_or_else(|| {
                Error::NoExecutorAvailable(
                    "no capability matched and no default executor is declared".to_string(),
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::from_definitions(vec![
            ExecutorDefinition::new("researcher", "research", "r"),
            ExecutorDefinition::new("strategist", "", "s"),
        ])
    }

    fn router() -> CapabilityRouter {
        CapabilityRouter::new().with_default_executor("strategist")
    }

    #[test]
    fn test_routes_on_capability_case_insensitive() {
        let decision = router()
            .route("Research AI marketing trends", &registry())
            .unwrap();
        assert_eq!(decision.executor_id, "researcher");
        assert_eq!(
            decision.reason,
            RouteReason::Matched {
                tag: "research".into()
            }
        );
    }

    #[test]
    fn test_falls_back_to_configured_default() {
        let decision = router().route("plan my Q1 budget", &registry()).unwrap();
        assert_eq!(decision.executor_id, "strategist");
        assert_eq!(decision.reason, RouteReason::Fallback);
    }

    #[test]
    fn test_missing_default_is_no_executor() {
        let registry = Registry::from_definitions(vec![ExecutorDefinition::new(
            "researcher",
            "research",
            "r",
        )]);
        let err = router().route("plan my Q1 budget", &registry).unwrap_err();
        assert!(matches!(err, Error::NoExecutorAvailable(_)));
    }

    #[test]
    fn test_first_match_wins_in_load_order() {
        let registry = Registry::from_definitions(vec![
            ExecutorDefinition::new("writer", "write", "w"),
            ExecutorDefinition::new("copywriter", "copywrite", "c"),
        ]);
        // "copywrite" is the more specific tag but "write" comes first
        for _ in 0..3 {
            let decision = router()
                .route("Copywrite a landing page", &registry)
                .unwrap();
            assert_eq!(decision.executor_id, "writer");
        }
    }

    #[test]
    fn test_empty_registry_fails_closed() {
        let err = router().route("anything", &Registry::empty()).unwrap_err();
        assert!(matches!(err, Error::NoExecutorAvailable(_)));
    }

    #[test]
    fn test_declared_default_used_without_configured_default() {
        let registry = Registry::from_definitions(vec![
            ExecutorDefinition::new("researcher", "research", "r"),
            ExecutorDefinition::new("generalist", "", "g").as_default(),
        ]);
        let decision = CapabilityRouter::new()
            .route("plan my Q1 budget", &registry)
            .unwrap();
        assert_eq!(decision.executor_id, "generalist");

        let bare = Registry::from_definitions(vec![ExecutorDefinition::new(
            "researcher",
            "research",
            "r",
        )]);
        assert!(CapabilityRouter::new().route("plan", &bare).is_err());
    }

    #[test]
    fn test_fallback_ignores_capabilities() {
        let registry = registry();
        assert_eq!(router().fallback(&registry).unwrap().id, "strategist");
        assert!(router().fallback(&Registry::empty()).is_err());
    }

    #[test]
    fn test_blank_default_is_none() {
        assert_eq!(
            CapabilityRouter::new()
                .with_default_executor("  ")
                .default_executor(),
            None
        );
    }
}
