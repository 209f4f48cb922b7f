//! Server initialization and main run loop
//!
//! Contains `run()` for the orchestrator server and `build_engine()`, which
//! the one-shot CLI shares.

use super::config::AppConfig;
use super::loader::load_config;
use super::providers::{build_cache, build_gateway, build_knowledge, ensure_data_dir};
use super::shutdown::wait_for_shutdown_signal;
use super::validation::validate_config;
use crate::api::AppState;
use anyhow::{Context, Result};
use relaymesh_core::{CapabilityRouter, EngineContext, RegistryStatus};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Load and validate configuration
pub fn load_validated_config() -> Result<AppConfig> {
    let config = load_config().context("Failed to load configuration")?;
    validate_config(&config)?;
    Ok(config)
}

/// Build the per-process engine
pub async fn build_engine(config: &AppConfig) -> Result<Arc<EngineContext>> {
    ensure_data_dir(config)?;

    let router = CapabilityRouter::new().with_default_executor(&config.registry.default_executor);
    let gateway = build_gateway(&config.llm);
    let cache = build_cache(config).await;

    let mut engine = EngineContext::load(&config.registry.path, router, gateway, cache);
    if let Some(knowledge) = build_knowledge(config).await {
        engine = engine.with_knowledge(knowledge);
    }
    if let RegistryStatus::Unavailable(msg) = engine.registry_status() {
        warn!(
            "Executor registry at '{}' is unavailable ({}); /health/ready will report 503",
            config.registry.path, msg
        );
    }

    Ok(Arc::new(engine))
}

/// Run the orchestrator server
pub async fn run() -> Result<()> {
    let config = load_validated_config()?;
    info!("Configuration loaded");

    let engine = build_engine(&config).await?;
    let health = engine.health();
    info!(
        "Executors loaded: {:?} (brain: {:?})",
        health.executors, health.brain
    );

    let shutdown = CancellationToken::new();
    let state = AppState::new(
        engine,
        Duration::from_secs(config.server.request_timeout_secs),
        shutdown.clone(),
    );
    let app = crate::api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            // In-flight runs observe this and stop at their next await point
            shutdown.cancel();
        })
        .await
        .context("HTTP server error")?;

    info!("Relaymesh shutdown complete");
    Ok(())
}
