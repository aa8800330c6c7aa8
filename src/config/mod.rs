//! # Configuration Management
//!
//! Configuration is loaded from a TOML file ([`AppConfig::load`]) or from
//! `EDGEPASS_*` environment variables ([`AppConfig::from_env`]) and validated
//! before use. Library types take already-built configs; nothing here is read
//! implicitly.
//!
//! ```toml
//! [resources.media]
//! distribution_url = "https://cdn.example.com"
//! private_key_path = "/etc/edgepass/media.pem"
//! key_pair_id = "K2JCJMDEHXQW5F"
//! cookie_domain = "cdn.example.com"
//!
//! [secrets]
//! secret_name = "prod/db"
//!
//! [secrets.vault]
//! address = "https://vault.internal:8200"
//! ```

pub mod settings;

pub use settings::{
    AppConfig, ObservabilityConfig, ResourceConfig, SecretsConfig, DEFAULT_RESOURCE,
};
