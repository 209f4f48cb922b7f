//! Server module for Relaymesh
//!
//! Contains server initialization and runtime logic.
//!
//! # Module Structure
//!
//! - `config`: Configuration structures
//! - `loader`: Configuration loading from files and environment
//! - `validation`: Startup configuration checks
//! - `providers`: Provider gateway and semantic cache construction
//! - `init`: Orchestrator server run loop
//! - `relay`: Relay gateway run loop
//! - `shutdown`: Ctrl+C / SIGTERM handling

pub mod config;
mod init;
mod loader;
mod providers;
mod relay;
mod shutdown;
mod validation;

// Re-export public API
pub use init::{build_engine, load_validated_config, run};
pub use relay::run_relay;
