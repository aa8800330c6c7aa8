//! Integration tests for cache-aside secret lookup against a mocked Vault
//!
//! Vault's KV v2 HTTP API is served by wiremock; the shared cache is the
//! in-process implementation shared between cache instances the way several
//! processes share one Redis.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use edgepass::cli::exit_code;
use edgepass::cli::output::OutputFormat;
use edgepass::cli::secret::handle_secret_command;
use edgepass::secrets::{
    DatabaseCredentials, InMemorySharedCache, SecretCache, SecretName, SecretString, SecretsError,
    SharedCache, VaultConfig, VaultSecretStore,
};
use edgepass::{AppConfig, Error};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn kv2_response(data: Value) -> Value {
    json!({
        "request_id": "8d1c3a52-0000-0000-0000-000000000000",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": {
            "data": data,
            "metadata": {
                "created_time": "2025-06-01T00:00:00.000000Z",
                "custom_metadata": null,
                "deletion_time": "",
                "destroyed": false,
                "version": 3
            }
        },
        "wrap_info": null,
        "warnings": null,
        "auth": null
    })
}

fn db_secret() -> Value {
    json!({
        "host": "db.internal",
        "port": 3306,
        "dbname": "shop",
        "username": "app",
        "password": "hunter2"
    })
}

fn vault_store(server: &MockServer) -> VaultSecretStore {
    VaultSecretStore::new(VaultConfig {
        address: server.uri(),
        token: Some(SecretString::new("integration-token")),
        namespace: None,
        mount_path: "secret".to_string(),
    })
    .unwrap()
}

async fn mount_secret(server: &MockServer, name: &str, data: Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/secret/data/{}", name)))
        .and(header("X-Vault-Token", "integration-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kv2_response(data)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// A cold lookup reads Vault once; later lookups from any instance sharing
/// the cache are served without touching Vault.
#[tokio::test]
async fn test_vault_is_read_once_across_instances() {
    let server = MockServer::start().await;
    mount_secret(&server, "prod/db", db_secret(), 1).await;

    let shared = InMemorySharedCache::new();
    let name = SecretName::new("prod/db");

    let first = SecretCache::new(vault_store(&server), shared.clone());
    let record = first.get(&name).await.unwrap();
    assert_eq!(record.get("host"), Some("db.internal"));
    assert_eq!(record.get("port"), Some("3306"));

    let ttl = shared.ttl(&name.cache_key()).await.unwrap();
    assert!(ttl > Duration::from_secs(3590) && ttl <= Duration::from_secs(3600));

    // Another process: empty memo, warm shared cache
    let second = SecretCache::new(vault_store(&server), shared.clone());
    assert_eq!(second.get(&name).await.unwrap(), record);

    // Memo hit after invalidation falls back to the shared cache, not Vault
    second.invalidate(&name);
    assert_eq!(second.memo_len(), 0);
    assert_eq!(second.get(&name).await.unwrap(), record);

    let creds = DatabaseCredentials::from_record(&record).unwrap();
    assert_eq!(creds.dsn(), "mysql:host=db.internal;port=3306;dbname=shop");
    assert_eq!(creds.password.expose_secret(), "hunter2");
}

#[tokio::test]
async fn test_mirrored_binary_secret() {
    let server = MockServer::start().await;
    // {"api_key":"abc"} base64-encoded
    mount_secret(&server, "mirrored", json!({"SecretBinary": "eyJhcGlfa2V5IjoiYWJjIn0="}), 1)
        .await;

    let cache = SecretCache::new(vault_store(&server), InMemorySharedCache::new());
    let record = cache.get(&SecretName::new("mirrored")).await.unwrap();
    assert_eq!(record.get("api_key"), Some("abc"));
}

#[tokio::test]
async fn test_vault_failures_are_fatal_and_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/data/locked"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"errors": ["permission denied"]})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let shared = InMemorySharedCache::new();
    let cache = SecretCache::new(vault_store(&server), shared.clone());
    let name = SecretName::new("locked");

    for _ in 0..2 {
        let err = cache.get(&name).await.unwrap_err();
        assert!(matches!(err, SecretsError::Vault { .. }));
        assert!(err.is_fatal());
    }

    assert!(shared.is_empty().await);
    assert_eq!(cache.memo_len(), 0);
}

/// A Vault refusal surfaced through the `secret` command keeps its error
/// type, so the process exits with the unavailable-service code.
#[tokio::test]
async fn test_secret_command_reports_vault_failure_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/data/locked"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"errors": ["permission denied"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = AppConfig::from_toml_str(&format!(
        r#"
        [secrets]
        secret_name = "locked"

        [secrets.vault]
        address = "{}"
        token = "integration-token"
        "#,
        server.uri()
    ))
    .unwrap();

    let err = handle_secret_command(config.require_secrets().unwrap(), None, OutputFormat::Text)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::Secrets(SecretsError::Vault { .. }))
    ));
    assert_eq!(exit_code(&err), 69);
    assert!(format!("{:#}", err).contains("Failed to resolve secret 'locked'"));
}

#[tokio::test]
async fn test_empty_vault_secret_is_rejected() {
    let server = MockServer::start().await;
    mount_secret(&server, "empty", json!({}), 1).await;

    let shared = InMemorySharedCache::new();
    let cache = SecretCache::new(vault_store(&server), shared.clone());

    let err = cache.get(&SecretName::new("empty")).await.unwrap_err();
    assert!(matches!(err, SecretsError::EmptySecret { .. }));
    assert!(shared.is_empty().await);
}

/// Shared cache that refuses every call
struct DownCache;

#[async_trait]
impl SharedCache for DownCache {
    async fn get(&self, _key: &str) -> edgepass::secrets::Result<Option<String>> {
        Err(SecretsError::cache_transport("connection refused"))
    }

    async fn set_ex(
        &self,
        _key: &str,
        _ttl: Duration,
        _value: &str,
    ) -> edgepass::secrets::Result<()> {
        Err(SecretsError::cache_transport("connection refused"))
    }
}

#[tokio::test]
async fn test_unreachable_shared_cache_degrades_to_vault() {
    let server = MockServer::start().await;
    mount_secret(&server, "prod/db", db_secret(), 1).await;

    let shared: Arc<dyn SharedCache> = Arc::new(DownCache);
    let cache = SecretCache::new(vault_store(&server), shared)
        .with_cache_timeout(Duration::from_millis(100));

    let name = SecretName::new("prod/db");
    let record = cache.get(&name).await.unwrap();
    assert_eq!(record.get("username"), Some("app"));

    // Memoized: the second call neither reaches Vault nor the cache
    assert_eq!(cache.get(&name).await.unwrap(), record);
    assert_eq!(cache.memo_len(), 1);
}
