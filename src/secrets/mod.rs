//! Cache-aside secret retrieval.
//!
//! Secrets live in a remote vault and are read through a two-level cache:
//! a process-local memo and a shared key-value cache with a TTL.
//!
//! # Architecture
//!
//! ```text
//! caller → SecretCache::get(name) → [memo | SharedCache "secret:<name>" | SecretStore]
//!                                 → SecretRecord
//! ```
//!
//! - [`SecretStore`]: one authenticated call to the vault, no retry
//! - [`SharedCache`]: `GET` / `SETEX` over a pooled connection
//! - [`SecretCache`]: the read path, owning the memo and the TTL contract
//!
//! # Security Considerations
//!
//! - Secret values are never logged or exposed in error messages
//! - [`SecretRecord`] and [`SecretString`] redact themselves in `Debug`
//! - Buffers holding raw payloads are zeroed on drop

pub mod cache;
pub mod credentials;
pub mod error;
pub mod shared_cache;
pub mod store;
pub mod types;
pub mod vault;

pub use cache::{SecretCache, DEFAULT_CACHE_TIMEOUT, DEFAULT_CACHE_TTL};
pub use credentials::{DatabaseCredentials, DEFAULT_MYSQL_PORT};
pub use error::{Result, SecretsError};
#[cfg(feature = "redis-cache")]
pub use shared_cache::RedisSharedCache;
pub use shared_cache::{InMemorySharedCache, SharedCache};
pub use store::SecretStore;
pub use types::{SecretName, SecretRecord, SecretString};
pub use vault::{VaultConfig, VaultSecretStore};
