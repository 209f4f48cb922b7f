//! Relay gateway run loop
//!
//! Serves the same `/chat` surface as the orchestrator and forwards every
//! request upstream.

use super::init::load_validated_config;
use super::shutdown::wait_for_shutdown_signal;
use crate::api::RelayState;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

/// Run the relay gateway
pub async fn run_relay() -> Result<()> {
    let config = load_validated_config()?;

    let state = RelayState::new(
        &config.relay.upstream_url,
        Duration::from_secs(config.relay.timeout_secs),
    )?;
    let app = crate::api::relay_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.relay.port)
        .parse()
        .context("Invalid relay address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!(
        "Relay listening on http://{} -> {}",
        addr, config.relay.upstream_url
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("Relay server error")?;

    info!("Relay shutdown complete");
    Ok(())
}
