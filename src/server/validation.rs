//! Configuration validation
//!
//! Invalid numeric settings are a startup error. Risky but legal settings
//! only warn.

use super::config::AppConfig;
use anyhow::{bail, Result};
use tracing::warn;

/// Validate configuration before anything is constructed
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let cache = &config.cache;
    if !(cache.threshold > 0.0 && cache.threshold <= 1.0) {
        bail!(
            "cache.threshold must be in (0, 1], got {}",
            cache.threshold
        );
    }
    if cache.overfetch == 0 {
        bail!("cache.overfetch must be at least 1");
    }
    if cache.dimensions == 0 {
        bail!("cache.dimensions must be positive");
    }
    if config.knowledge.overfetch == 0 {
        bail!("knowledge.overfetch must be at least 1");
    }
    if config.knowledge.dimensions == 0 {
        bail!("knowledge.dimensions must be positive");
    }
    if config.server.request_timeout_secs == 0 {
        bail!("server.request_timeout_secs must be positive");
    }
    if config.llm.timeout_secs == 0 {
        bail!("llm.timeout_secs must be positive");
    }
    if config.relay.timeout_secs == 0 {
        bail!("relay.timeout_secs must be positive");
    }
    if config.registry.path.trim().is_empty() {
        bail!("registry.path must not be empty");
    }

    if config.llm.timeout_secs > config.server.request_timeout_secs {
        warn!(
            "llm.timeout_secs ({}) exceeds server.request_timeout_secs ({}); \
             requests will time out before the provider does",
            config.llm.timeout_secs, config.server.request_timeout_secs
        );
    }

    if config.relay.timeout_secs <= config.server.request_timeout_secs {
        warn!(
            "relay.timeout_secs ({}) does not exceed server.request_timeout_secs ({}); \
             the relay may cut off the orchestrator's timeout response",
            config.relay.timeout_secs, config.server.request_timeout_secs
        );
    }

    let is_production = std::env::var("RELAYMESH_ENV")
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false);
    if is_production && config.server.host == "0.0.0.0" {
        warn!(
            "SECURITY WARNING: Server is binding to all interfaces (0.0.0.0) in production. \
             Consider binding to 127.0.0.1 and using a reverse proxy."
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_threshold_bounds() {
        let mut config = AppConfig::default();
        config.cache.threshold = 1.0;
        assert!(validate_config(&config).is_ok());

        config.cache.threshold = 0.0;
        assert!(validate_config(&config).is_err());

        config.cache.threshold = 1.01;
        assert!(validate_config(&config).is_err());

        config.cache.threshold = f32::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut config = AppConfig::default();
        config.cache.overfetch = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.knowledge.overfetch = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("knowledge.overfetch"));

        let mut config = AppConfig::default();
        config.llm.timeout_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("llm.timeout_secs"));
    }
}
