//! Relaymesh Core - capability routing and orchestration
//!
//! This crate provides the request path of the mesh:
//! - Executor registry loaded from front-matter documents
//! - First-match capability router
//! - Provider gateway with per-call timeout
//! - `Start → Routed → Executed → Done` orchestration graph
//! - Strategy synthesis from research findings
//! - `EngineContext`, the immutable per-process engine

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analysis;
pub mod context;
pub mod error;
pub mod gateway;
pub mod graph;
pub mod registry;
pub mod router;

pub use analysis::{compose_analysis_task, Analysis, STRATEGY_OBJECTIVE};
pub use context::{BrainState, EngineContext, HealthSnapshot, RegistryStatus};
pub use error::{Error, FailureClass, Result};
pub use gateway::{ProviderGateway, DEFAULT_PROVIDER_TIMEOUT};
pub use graph::{ExecutionState, OrchestrationGraph, RunFailure, RunResult, RunSuccess, Stage};
pub use registry::{ExecutorDefinition, ModelParameters, Registry, RegistryLoader};
pub use router::{CapabilityRouter, RouteDecision, RouteReason};
