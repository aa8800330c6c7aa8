//! Shared key-value cache used in front of the vault.
//!
//! The contract is the Redis subset the cache-aside path needs: `GET key` and
//! `SETEX key ttl value`. [`InMemorySharedCache`] serves single-process
//! deployments and tests; `RedisSharedCache` (feature `redis-cache`) shares
//! entries across processes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use super::error::{Result, SecretsError};

/// String key-value store with per-entry TTL.
#[async_trait]
pub trait SharedCache: Send + Sync {
    /// Read `key`. `Ok(None)` on a miss or an expired entry.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::CacheTransport`] if the cache is unreachable
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set_ex(&self, key: &str, ttl: Duration, value: &str) -> Result<()>;
}

#[async_trait]
impl<T: SharedCache + ?Sized> SharedCache for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set_ex(&self, key: &str, ttl: Duration, value: &str) -> Result<()> {
        (**self).set_ex(key, ttl, value).await
    }
}

/// Cached entry with its TTL deadline.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Process-local [`SharedCache`] with manual TTL checking.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct InMemorySharedCache {
    inner: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl InMemorySharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining TTL of `key`, if present and not expired.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let cache = self.inner.read().await;
        cache.get(key).and_then(|entry| entry.expires_at.checked_duration_since(Instant::now()))
    }

    /// Remove expired entries.
    pub async fn cleanup_expired(&self) {
        let now = Instant::now();
        let mut cache = self.inner.write().await;
        cache.retain(|key, entry| {
            let expired = entry.expires_at <= now;
            if expired {
                debug!(cache_key = %key, "Removing expired cache entry");
            }
            !expired
        });
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl SharedCache for InMemorySharedCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let cache = self.inner.read().await;
        match cache.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                debug!(cache_key = %key, "Cache entry expired");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, ttl: Duration, value: &str) -> Result<()> {
        let expires_at = Instant::now().checked_add(ttl).ok_or_else(|| {
            SecretsError::cache_transport(format!("Cache TTL {}s is out of range", ttl.as_secs()))
        })?;
        let mut cache = self.inner.write().await;
        cache.insert(key.to_string(), CacheEntry { value: value.to_string(), expires_at });
        Ok(())
    }
}

#[cfg(feature = "redis-cache")]
pub use redis_backend::RedisSharedCache;

#[cfg(feature = "redis-cache")]
mod redis_backend {
    use super::*;
    use redis::aio::ConnectionManager;
    use redis::AsyncCommands;

    /// Redis-backed [`SharedCache`] over a multiplexed, auto-reconnecting connection.
    #[derive(Clone)]
    pub struct RedisSharedCache {
        connection: ConnectionManager,
    }

    impl std::fmt::Debug for RedisSharedCache {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("RedisSharedCache").finish_non_exhaustive()
        }
    }

    impl RedisSharedCache {
        /// Connect to `url` (e.g. `redis://cache.internal:6379/10`).
        pub async fn connect(url: &str) -> Result<Self> {
            let client = redis::Client::open(url).map_err(|e| {
                SecretsError::config_error(format!("Invalid shared cache URL: {}", e))
            })?;
            let connection = ConnectionManager::new(client)
                .await
                .map_err(|e| SecretsError::cache_transport(e.to_string()))?;
            Ok(Self { connection })
        }
    }

    #[async_trait]
    impl SharedCache for RedisSharedCache {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            let mut connection = self.connection.clone();
            connection
                .get::<_, Option<String>>(key)
                .await
                .map_err(|e| SecretsError::cache_transport(e.to_string()))
        }

        async fn set_ex(&self, key: &str, ttl: Duration, value: &str) -> Result<()> {
            let mut connection = self.connection.clone();
            connection
                .set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
                .await
                .map_err(|e| SecretsError::cache_transport(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemorySharedCache::new();
        cache.set_ex("secret:a", Duration::from_secs(60), "{}").await.unwrap();
        assert_eq!(cache.get("secret:a").await.unwrap().as_deref(), Some("{}"));
        assert_eq!(cache.get("secret:b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = InMemorySharedCache::new();
        cache.set_ex("secret:a", Duration::from_millis(50), "{}").await.unwrap();
        assert!(cache.get("secret:a").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.get("secret:a").await.unwrap().is_none());
        cache.cleanup_expired().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_ttl_reports_remaining_time() {
        let cache = InMemorySharedCache::new();
        cache.set_ex("secret:a", Duration::from_secs(3600), "{}").await.unwrap();
        let remaining = cache.ttl("secret:a").await.unwrap();
        assert!(remaining > Duration::from_secs(3590));
        assert!(remaining <= Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_is_a_transport_error() {
        let cache = InMemorySharedCache::new();
        let err = cache.set_ex("secret:a", Duration::from_secs(u64::MAX), "{}").await.unwrap_err();
        assert!(matches!(err, SecretsError::CacheTransport { .. }));
        assert!(!err.is_fatal());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache = InMemorySharedCache::new();
        let other = cache.clone();
        cache.set_ex("secret:a", Duration::from_secs(60), "v").await.unwrap();
        assert_eq!(other.get("secret:a").await.unwrap().as_deref(), Some("v"));
    }
}
