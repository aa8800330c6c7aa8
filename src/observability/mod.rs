//! # Observability
//!
//! Structured logging through `tracing`, with log-line redaction so that
//! credentials never reach log sinks even when a caller formats one by mistake.

pub mod logging;
pub mod redaction;

pub use logging::{init_logging, log_config_info};
pub use redaction::{RedactingMakeWriter, RedactionRule, RedactionRules, REDACTED};
