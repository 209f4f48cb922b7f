//! Relaymesh - capability-routed executor mesh
//!
//! CLI entry point for the relaymesh server, relay and one-shot runner.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod server;

/// Default log filter when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "relaymesh=info,relaymesh_core=info,relaymesh_cache=info,relaymesh_llm=info,tower_http=info";

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let json = std::env::var("RELAYMESH_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = cli::Cli::parse();
    if cli.command.is_some() {
        info!("Relaymesh v{}", env!("CARGO_PKG_VERSION"));
    }

    cli::run(cli).await
}
