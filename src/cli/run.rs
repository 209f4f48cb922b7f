//! `relaymesh run` - execute one task and print the result

use anyhow::{bail, Result};
use tokio_util::sync::CancellationToken;

/// Route and execute `task` once
pub async fn run(task: &str, user: &str) -> Result<()> {
    let config = crate::server::load_validated_config()?;
    let engine = crate::server::build_engine(&config).await?;
    engine.ensure_ready()?;

    let cancel = CancellationToken::new();
    let timeout = std::time::Duration::from_secs(config.server.request_timeout_secs);

    let run = engine.run(task, user, &cancel);
    let result = tokio::select! {
        result = tokio::time::timeout(timeout, run) => match result {
            Ok(result) => result,
            Err(_) => bail!("Timed out after {}s", timeout.as_secs()),
        },
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            bail!("Interrupted");
        }
    };

    match result {
        Ok(success) => {
            println!("Executor: {}", success.state.selected_executor_id);
            println!(
                "Agent chain: {}",
                success.state.history().join(" -> ")
            );
            if success.cache_hit {
                println!("(served from semantic cache)");
            }
            println!();
            println!("{}", success.state.final_output);
            Ok(())
        }
        Err(failure) => {
            if !failure.state.history().is_empty() {
                eprintln!("Agent chain: {}", failure.state.history().join(" -> "));
            }
            bail!("{}", failure.error)
        }
    }
}
