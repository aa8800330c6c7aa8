//! Cache-aside secret lookup.
//!
//! [`SecretCache`] resolves a [`SecretName`] to a [`SecretRecord`] through
//! three tiers:
//!
//! 1. a process-local memo, so one process resolves each name once
//! 2. a [`SharedCache`] keyed `secret:<name>` with a fixed TTL
//! 3. the authoritative [`SecretStore`]
//!
//! The shared cache is best effort. Transport failures, timeouts and
//! undecodable entries degrade to a vault fetch, and a failed write-back is
//! logged and ignored. Problems with the vault payload itself are fatal.
//!
//! # Lifecycle
//!
//! Create one `SecretCache` per process (or per test) and share it behind an
//! `Arc`. Nothing is global: dropping the cache drops the memo.
//!
//! # Example
//!
//! ```rust,ignore
//! use edgepass::secrets::{InMemorySharedCache, SecretCache, VaultSecretStore};
//! use std::time::Duration;
//!
//! let cache = SecretCache::new(vault_store, InMemorySharedCache::new())
//!     .with_ttl(Duration::from_secs(3600));
//!
//! let record = cache.get(&"prod/db".into()).await?;
//! let host = record.get("host");
//! ```

use dashmap::DashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::{Result, SecretsError};
use super::shared_cache::SharedCache;
use super::store::SecretStore;
use super::types::{SecretName, SecretRecord};

/// Default TTL of shared cache entries.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Default bound on a single shared cache round trip.
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(500);

/// Cache-aside wrapper around a [`SecretStore`].
///
/// # Concurrency
///
/// The memo is a sharded map, so lookups for different names never block one
/// another. Concurrent cold lookups of the same name are not coalesced: each
/// may fetch from the vault and the last shared-cache write wins. Every
/// writer derives its value from the vault, so only redundant calls result.
pub struct SecretCache<S, C> {
    store: S,
    shared: C,
    memo: DashMap<SecretName, SecretRecord>,
    ttl: Duration,
    cache_timeout: Duration,
}

impl<S, C> std::fmt::Debug for SecretCache<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCache")
            .field("memoized", &self.memo.len())
            .field("ttl", &self.ttl)
            .field("cache_timeout", &self.cache_timeout)
            .finish()
    }
}

impl<S: SecretStore, C: SharedCache> SecretCache<S, C> {
    /// Creates a cache with the default TTL (3600 s) and cache timeout (500 ms).
    pub fn new(store: S, shared: C) -> Self {
        Self {
            store,
            shared,
            memo: DashMap::new(),
            ttl: DEFAULT_CACHE_TTL,
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }

    /// TTL applied to shared cache write-backs.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Upper bound for each shared cache round trip.
    pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache_timeout = timeout;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Resolve `name` to its record.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::Vault`] if the vault call fails
    /// - [`SecretsError::EmptySecret`] if the vault returned no data
    /// - [`SecretsError::Decode`] if the vault payload is not a JSON object
    pub async fn get(&self, name: &SecretName) -> Result<SecretRecord> {
        if let Some(record) = self.memo.get(name) {
            debug!(secret_name = %name, "Memo hit for secret");
            return Ok(record.clone());
        }

        let cache_key = name.cache_key();

        if let Some(record) = self.read_shared(name, &cache_key).await {
            self.memo.insert(name.clone(), record.clone());
            return Ok(record);
        }

        let record = self.fetch_from_store(name).await?;

        self.write_shared(name, &cache_key, &record).await;
        self.memo.insert(name.clone(), record.clone());

        Ok(record)
    }

    /// Drop the memoized record for `name`. The shared cache is untouched.
    pub fn invalidate(&self, name: &SecretName) {
        if self.memo.remove(name).is_some() {
            debug!(secret_name = %name, "Invalidated memoized secret");
        }
    }

    /// Number of memoized records.
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    async fn read_shared(&self, name: &SecretName, cache_key: &str) -> Option<SecretRecord> {
        let read = self.shared.get(cache_key);
        let cached = match tokio::time::timeout(self.cache_timeout, read).await {
            Ok(Ok(Some(cached))) => cached,
            Ok(Ok(None)) => {
                debug!(secret_name = %name, cache_key = %cache_key, "Shared cache miss");
                return None;
            }
            Ok(Err(e)) => {
                warn!(
                    secret_name = %name,
                    error = %e,
                    "Shared cache read failed, falling back to vault"
                );
                return None;
            }
            Err(_) => {
                warn!(
                    secret_name = %name,
                    timeout_ms = self.cache_timeout.as_millis() as u64,
                    "Shared cache read timed out, falling back to vault"
                );
                return None;
            }
        };

        match SecretRecord::from_json(name, cached.as_bytes()) {
            Ok(record) if !record.is_empty() => {
                debug!(secret_name = %name, cache_key = %cache_key, "Shared cache hit");
                Some(record)
            }
            Ok(_) => {
                debug!(secret_name = %name, "Shared cache entry is empty, treating as miss");
                None
            }
            Err(e) => {
                warn!(
                    secret_name = %name,
                    error = %e,
                    "Shared cache entry is undecodable, treating as miss"
                );
                None
            }
        }
    }

    async fn fetch_from_store(&self, name: &SecretName) -> Result<SecretRecord> {
        let payload = self.store.fetch(name).await?;

        if payload.iter().all(u8::is_ascii_whitespace) {
            return Err(SecretsError::empty_secret(name.as_str()));
        }

        let record = SecretRecord::from_json(name, &payload)?;
        if record.is_empty() {
            return Err(SecretsError::empty_secret(name.as_str()));
        }

        info!(secret_name = %name, fields = record.len(), "Fetched secret from vault");
        Ok(record)
    }

    async fn write_shared(&self, name: &SecretName, cache_key: &str, record: &SecretRecord) {
        let payload = zeroize::Zeroizing::new(record.to_json());
        let write = self.shared.set_ex(cache_key, self.ttl, &payload);

        match tokio::time::timeout(self.cache_timeout, write).await {
            Ok(Ok(())) => debug!(
                secret_name = %name,
                ttl_secs = self.ttl.as_secs(),
                "Cached secret in shared cache"
            ),
            Ok(Err(e)) => {
                warn!(secret_name = %name, error = %e, "Shared cache write-back failed")
            }
            Err(_) => warn!(secret_name = %name, "Shared cache write-back timed out"),
        }
    }
}
