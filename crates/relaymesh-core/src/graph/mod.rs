//! Orchestration Graph
//!
//! Ties the router, registry, gateway and (optionally) the semantic cache
//! together for one task at a time.
//!
//! # Module Structure
//!
//! - `state`: `ExecutionState` and `Stage`
//! - `engine`: `OrchestrationGraph` and run outcomes

mod engine;
mod state;

#[cfg(test)]
mod tests;

pub use engine::{OrchestrationGraph, RunFailure, RunResult, RunSuccess};
pub use state::{ExecutionState, Stage};
