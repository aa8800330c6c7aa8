//! `edgepass secret`: resolve a secret through the cache and show its shape.
//!
//! Values are never printed; only field names and, for database credential
//! records, the connection DSN.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::warn;

use super::output::{print_json, print_rows, OutputFormat};
use crate::config::SecretsConfig;
use crate::errors::Error;
use crate::secrets::{
    DatabaseCredentials, InMemorySharedCache, SecretCache, SecretName, SharedCache,
    VaultSecretStore,
};

type CliSecretCache = SecretCache<VaultSecretStore, Arc<dyn SharedCache>>;

#[derive(Debug, Serialize)]
struct SecretOutput<'a> {
    name: &'a str,
    fields: Vec<&'a str>,
    dsn: Option<String>,
}

/// Build the secret cache described by `config`.
///
/// An unreachable shared cache degrades to the in-process cache.
pub async fn build_secret_cache(config: &SecretsConfig) -> Result<CliSecretCache> {
    let store = VaultSecretStore::new(config.vault.clone())
        .map_err(Error::from)
        .context("Failed to configure Vault")?;
    let shared = shared_cache(config).await?;

    Ok(SecretCache::new(store, shared)
        .with_ttl(config.cache_ttl())
        .with_cache_timeout(config.cache_timeout()))
}

#[cfg(feature = "redis-cache")]
async fn shared_cache(config: &SecretsConfig) -> Result<Arc<dyn SharedCache>> {
    use crate::secrets::{RedisSharedCache, SecretsError};

    let Some(url) = config.cache_url.as_deref() else {
        return Ok(Arc::new(InMemorySharedCache::new()));
    };

    match RedisSharedCache::connect(url).await {
        Ok(cache) => Ok(Arc::new(cache)),
        Err(e @ SecretsError::CacheTransport { .. }) => {
            warn!(error = %e, "Shared cache unreachable, using in-process cache");
            Ok(Arc::new(InMemorySharedCache::new()))
        }
        Err(e) => Err(Error::from(e)).context("Failed to configure shared cache"),
    }
}

#[cfg(not(feature = "redis-cache"))]
async fn shared_cache(config: &SecretsConfig) -> Result<Arc<dyn SharedCache>> {
    if config.cache_url.is_some() {
        warn!(
            "cache_url is set but edgepass was built without the redis-cache feature; \
             using in-process cache"
        );
    }
    Ok(Arc::new(InMemorySharedCache::new()))
}

pub async fn handle_secret_command(
    config: &SecretsConfig,
    name: Option<String>,
    output: OutputFormat,
) -> Result<()> {
    let name = SecretName::new(name.unwrap_or_else(|| config.secret_name.clone()));
    let cache = build_secret_cache(config).await?;

    let record = cache
        .get(&name)
        .await
        .map_err(Error::from)
        .with_context(|| format!("Failed to resolve secret '{}'", name))?;
    let dsn = DatabaseCredentials::from_record(&record).ok().map(|creds| creds.dsn());

    match output {
        OutputFormat::Text => {
            let mut rows = vec![
                ("secret", name.to_string()),
                ("fields", record.keys().collect::<Vec<_>>().join(", ")),
            ];
            if let Some(dsn) = dsn {
                rows.push(("dsn", dsn));
            }
            print_rows(&rows);
        }
        OutputFormat::Json => print_json(&SecretOutput {
            name: name.as_str(),
            fields: record.keys().collect(),
            dsn,
        })?,
    }

    Ok(())
}
