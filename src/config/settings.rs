//! # Configuration Settings
//!
//! Defines the configuration structure for edgepass: named CDN resources,
//! the vault-backed secret cache and logging.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use validator::Validate;

use crate::errors::{Error, Result};
use crate::secrets::{SecretString, VaultConfig};

/// Name of the resource built from `EDGEPASS_*` variables.
pub const DEFAULT_RESOURCE: &str = "default";

const DEFAULT_REGION: &str = "us-east-1";

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// CDN resources keyed by name
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceConfig>,

    /// Secret retrieval (optional; only needed by secret lookups)
    #[serde(default)]
    #[validate(nested)]
    pub secrets: Option<SecretsConfig>,

    /// Logging configuration
    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;

        for (name, resource) in &self.resources {
            if name.trim().is_empty() {
                return Err(Error::validation("Resource names cannot be empty"));
            }
            Validate::validate(resource).map_err(|e| match Error::from(e) {
                Error::Validation { message, .. } => Error::validation_field(
                    format!("resource '{}': {}", name, message),
                    name.as_str(),
                ),
                other => other,
            })?;
            resource.validate_custom(name)?;
        }

        if let Some(secrets) = &self.secrets {
            secrets.validate_custom()?;
        }

        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::io(e, format!("Failed to read configuration file {}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Build configuration from `EDGEPASS_*` environment variables.
    ///
    /// `EDGEPASS_DISTRIBUTION_URL` defines a single resource named
    /// [`DEFAULT_RESOURCE`]; `EDGEPASS_SECRET_NAME` enables the secrets section.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(distribution_url) = lookup("EDGEPASS_DISTRIBUTION_URL") {
            let resource = ResourceConfig {
                distribution_url,
                region: lookup("EDGEPASS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
                private_key_path: PathBuf::from(required_var(
                    &lookup,
                    "EDGEPASS_PRIVATE_KEY_PATH",
                )?),
                key_pair_id: required_var(&lookup, "EDGEPASS_KEY_PAIR_ID")?,
                cookie_domain: required_var(&lookup, "EDGEPASS_COOKIE_DOMAIN")?,
                default_ttl_secs: parse_var(
                    &lookup,
                    "EDGEPASS_DEFAULT_TTL_SECS",
                    default_resource_ttl_secs(),
                )?,
            };
            config.resources.insert(DEFAULT_RESOURCE.to_string(), resource);
        }

        if let Some(secret_name) = lookup("EDGEPASS_SECRET_NAME") {
            let defaults = VaultConfig::default();
            let vault = VaultConfig {
                address: lookup("EDGEPASS_VAULT_ADDR")
                    .or_else(|| lookup("VAULT_ADDR"))
                    .unwrap_or(defaults.address),
                token: lookup("EDGEPASS_VAULT_TOKEN")
                    .or_else(|| lookup("VAULT_TOKEN"))
                    .map(SecretString::new),
                namespace: lookup("VAULT_NAMESPACE"),
                mount_path: lookup("EDGEPASS_VAULT_MOUNT").unwrap_or(defaults.mount_path),
            };

            config.secrets = Some(SecretsConfig {
                secret_name,
                region: lookup("EDGEPASS_REGION"),
                vault,
                cache_url: lookup("EDGEPASS_CACHE_URL"),
                cache_ttl_secs: parse_var(
                    &lookup,
                    "EDGEPASS_CACHE_TTL_SECS",
                    default_cache_ttl_secs(),
                )?,
                cache_timeout_ms: parse_var(
                    &lookup,
                    "EDGEPASS_CACHE_TIMEOUT_MS",
                    default_cache_timeout_ms(),
                )?,
            });
        }

        let observability = &mut config.observability;
        if let Some(level) = lookup("EDGEPASS_LOG_LEVEL") {
            observability.log_level = level;
        }
        observability.json_logging =
            parse_flag(&lookup, "EDGEPASS_LOG_JSON", observability.json_logging);
        observability.redact_logs =
            parse_flag(&lookup, "EDGEPASS_REDACT_LOGS", observability.redact_logs);

        config.validate()?;
        Ok(config)
    }

    /// Look up a configured resource by name.
    pub fn resource(&self, name: &str) -> Result<&ResourceConfig> {
        self.resources.get(name).ok_or_else(|| Error::not_found("resource", name))
    }

    /// The secrets section, or a configuration error when it is absent.
    pub fn require_secrets(&self) -> Result<&SecretsConfig> {
        self.secrets.as_ref().ok_or_else(|| Error::config("No [secrets] section configured"))
    }
}

fn required_var<F: Fn(&str) -> Option<String>>(lookup: &F, name: &str) -> Result<String> {
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| Error::validation_field(format!("{} is required", name), name))
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| {
            Error::validation_field(format!("Invalid value '{}' for {}: {}", raw, name, e), name)
        }),
    }
}

fn parse_flag<F: Fn(&str) -> Option<String>>(lookup: &F, name: &str, default: bool) -> bool {
    lookup(name).map(|s| s.eq_ignore_ascii_case("true") || s == "1").unwrap_or(default)
}

fn default_resource_ttl_secs() -> u64 {
    1800
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_cache_timeout_ms() -> u64 {
    500
}

/// One CDN distribution that access cookies are issued for
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResourceConfig {
    /// Distribution base URL, e.g. `https://cdn.example.com`
    #[validate(url(message = "Distribution URL must be a valid URL"))]
    pub distribution_url: String,

    /// Cloud region the distribution's key lives in
    #[serde(default = "default_region")]
    #[validate(length(min = 1, message = "Region cannot be empty"))]
    pub region: String,

    /// Path to the RSA private key (PEM or DER)
    pub private_key_path: PathBuf,

    /// Key pair identifier registered with the distribution
    #[validate(length(min = 1, message = "Key pair ID cannot be empty"))]
    pub key_pair_id: String,

    /// Domain attribute for the emitted cookies
    #[validate(length(min = 1, message = "Cookie domain cannot be empty"))]
    pub cookie_domain: String,

    /// Lifetime of issued policies in seconds
    #[serde(default = "default_resource_ttl_secs")]
    #[validate(range(min = 1, message = "Default TTL must be at least 1 second"))]
    pub default_ttl_secs: u64,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl ResourceConfig {
    /// Get the default policy lifetime as Duration
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    fn validate_custom(&self, name: &str) -> Result<()> {
        let url = url::Url::parse(&self.distribution_url).map_err(|e| {
            Error::validation_field(
                format!("resource '{}': invalid distribution URL: {}", name, e),
                name,
            )
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::validation_field(
                format!("resource '{}': distribution URL must use http or https", name),
                name,
            ));
        }

        if self.distribution_url.trim_end_matches('/').ends_with("/*") {
            return Err(Error::validation_field(
                format!("resource '{}': distribution URL must not include the '/*' wildcard", name),
                name,
            ));
        }

        if self.private_key_path.as_os_str().is_empty() {
            return Err(Error::validation_field(
                format!("resource '{}': private key path cannot be empty", name),
                name,
            ));
        }

        Ok(())
    }
}

/// Vault-backed secret retrieval configuration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SecretsConfig {
    /// Secret read by `edgepass secret` when no name is given
    #[validate(length(min = 1, message = "Secret name cannot be empty"))]
    pub secret_name: String,

    /// Region of the secret, recorded in logs
    #[serde(default)]
    pub region: Option<String>,

    /// Vault connection
    #[serde(default)]
    pub vault: VaultConfig,

    /// Shared cache URL (`redis://...`); in-process cache when absent
    #[serde(default)]
    pub cache_url: Option<String>,

    /// Shared cache entry lifetime in seconds
    #[serde(default = "default_cache_ttl_secs")]
    #[validate(range(
        min = 1,
        max = 31_536_000,
        message = "Cache TTL must be between 1 second and 365 days"
    ))]
    pub cache_ttl_secs: u64,

    /// Upper bound on a single shared cache call in milliseconds
    #[serde(default = "default_cache_timeout_ms")]
    #[validate(range(
        min = 1,
        max = 60000,
        message = "Cache timeout must be between 1 and 60000 milliseconds"
    ))]
    pub cache_timeout_ms: u64,
}

impl SecretsConfig {
    /// Get cache TTL as Duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Get shared cache call timeout as Duration
    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    fn validate_custom(&self) -> Result<()> {
        if self.vault.address.trim().is_empty() {
            return Err(Error::validation_field("Vault address cannot be empty", "vault.address"));
        }

        if let Some(cache_url) = &self.cache_url {
            if !cache_url.starts_with("redis://") && !cache_url.starts_with("rediss://") {
                return Err(Error::validation_field(
                    "Cache URL must start with 'redis://' or 'rediss://'",
                    "cache_url",
                ));
            }
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Service name attached to startup logs
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level or filter directive, overridden by `RUST_LOG`
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,

    /// Apply redaction rules to log output
    pub redact_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "edgepass".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
            redact_logs: true,
        }
    }
}
