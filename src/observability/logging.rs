//! # Structured Logging
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` (`RUST_LOG` wins
//! over the configured level) feeding a plain or JSON fmt layer on stderr,
//! written through [`RedactingMakeWriter`] when redaction is enabled.

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use super::redaction::{RedactingMakeWriter, RedactionRules};
use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::{Error, Result};

/// Install the global subscriber.
///
/// Returns `Ok(false)` when another subscriber is already installed (tests,
/// embedding applications); that is not an error.
pub fn init_logging(config: &ObservabilityConfig) -> Result<bool> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| {
            Error::config_with_source(
                format!("Invalid log level '{}'", config.log_level),
                Box::new(e),
            )
        })?;

    let rules =
        if config.redact_logs { RedactionRules::default() } else { RedactionRules::empty() };
    let ansi = rules.is_empty();
    let writer = RedactingMakeWriter::new(std::io::stderr, rules);

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json_logging {
        registry.with(fmt::layer().json().with_writer(writer)).try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_ansi(ansi).with_writer(writer))
            .try_init()
    };

    Ok(installed.is_ok())
}

/// Log configuration at startup
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        service_name = %config.observability.service_name,
        resources = config.resources.len(),
        secrets_enabled = config.secrets.is_some(),
        shared_cache = config.secrets.as_ref().and_then(|s| s.cache_url.as_ref()).is_some(),
        json_logging = config.observability.json_logging,
        redact_logs = config.observability.redact_logs,
        "edgepass configuration"
    );
}
