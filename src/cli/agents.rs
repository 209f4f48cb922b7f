//! `relaymesh agents` - list the executor registry

use anyhow::Result;
use relaymesh_core::{RegistryLoader, RouteReason};

/// Print every executor in routing order
pub fn run() -> Result<()> {
    let config = crate::server::load_validated_config()?;
    let registry = RegistryLoader::with_path(&config.registry.path).load()?;

    if registry.is_empty() {
        println!("No executors found in '{}'", config.registry.path);
        return Ok(());
    }

    println!("Executors in '{}' (routing order):", config.registry.path);
    for executor in registry.iter() {
        let tag = if executor.has_capability() {
            executor.capability_tag.as_str()
        } else {
            "-"
        };
        let model = executor
            .model_parameters
            .model
            .as_deref()
            .unwrap_or("(fallback)");
        let marker = if executor.id == config.registry.default_executor || executor.is_default {
            " [default]"
        } else {
            ""
        };
        println!("  {:<16} capability: {:<12} model: {}{}", executor.id, tag, model, marker);
    }

    let router = relaymesh_core::CapabilityRouter::new()
        .with_default_executor(&config.registry.default_executor);
    match router.route("", &registry) {
        Ok(decision) if decision.reason == RouteReason::Fallback => {
            println!("\nFallback executor: {}", decision.executor_id);
        }
        Ok(_) => {}
        Err(e) => println!("\nWarning: {}", e),
    }

    Ok(())
}
