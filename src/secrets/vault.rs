//! HashiCorp Vault secret store.
//!
//! Reads secrets from Vault's KV v2 engine. A secret is either stored as a
//! JSON map directly, or wrapped in a `SecretString` / `SecretBinary` field
//! pair (binary form base64-encoded), which is the layout produced when
//! secrets are mirrored from a cloud secrets manager.
//!
//! # Example
//!
//! ```rust,ignore
//! use edgepass::secrets::{SecretStore, VaultConfig, VaultSecretStore};
//!
//! let store = VaultSecretStore::new(VaultConfig {
//!     address: "https://vault.example.com".to_string(),
//!     token: Some("vault-token".into()),
//!     namespace: None,
//!     mount_path: "secret".to_string(),
//! })?;
//! let payload = store.fetch(&"prod/db".into()).await?;
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info};
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};
use vaultrs::kv2;
use zeroize::Zeroizing;

use super::error::{Result, SecretsError};
use super::store::{resolve_payload, SecretStore};
use super::types::{SecretName, SecretString};

/// Field holding the string form of a mirrored secret.
const SECRET_STRING_FIELD: &str = "SecretString";

/// Field holding the base64 binary form of a mirrored secret.
const SECRET_BINARY_FIELD: &str = "SecretBinary";

/// Configuration for the HashiCorp Vault store.
#[derive(Debug, Clone, Deserialize)]
pub struct VaultConfig {
    /// Vault server address (e.g., "https://vault.example.com:8200")
    pub address: String,

    /// Vault authentication token
    pub token: Option<SecretString>,

    /// Vault namespace (for Enterprise multi-tenancy)
    pub namespace: Option<String>,

    /// KV v2 mount path (default: "secret")
    #[serde(default = "default_mount_path")]
    pub mount_path: String,
}

fn default_mount_path() -> String {
    "secret".to_string()
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8200".to_string(),
            token: None,
            namespace: None,
            mount_path: default_mount_path(),
        }
    }
}

/// Vault-backed [`SecretStore`].
pub struct VaultSecretStore {
    client: VaultClient,
    mount_path: String,
}

impl std::fmt::Debug for VaultSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSecretStore")
            .field("mount_path", &self.mount_path)
            .field("client", &"[VaultClient]")
            .finish()
    }
}

impl VaultSecretStore {
    /// Creates a new Vault store. No network call is made until the first fetch.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::Config`] if the address is empty or the settings are invalid
    pub fn new(config: VaultConfig) -> Result<Self> {
        if config.address.is_empty() {
            return Err(SecretsError::config_error("Vault address cannot be empty"));
        }

        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder.address(&config.address);

        if let Some(ref token) = config.token {
            settings_builder.token(token.expose_secret());
        }

        if let Some(namespace) = config.namespace {
            settings_builder.namespace(Some(namespace));
        }

        let settings = settings_builder.build().map_err(|e| {
            SecretsError::config_error(format!("Invalid Vault configuration: {}", e))
        })?;

        let client = VaultClient::new(settings).map_err(|e| {
            SecretsError::config_error(format!("Failed to create Vault client: {}", e))
        })?;

        info!(
            address = %config.address,
            mount_path = %config.mount_path,
            "Configured Vault secret store"
        );

        Ok(Self { client, mount_path: config.mount_path })
    }
}

#[async_trait]
impl SecretStore for VaultSecretStore {
    async fn fetch(&self, name: &SecretName) -> Result<Zeroizing<Vec<u8>>> {
        debug!(secret_name = %name, mount_path = %self.mount_path, "Fetching secret from Vault");

        let data: Map<String, Value> = kv2::read(&self.client, &self.mount_path, name.as_str())
            .await
            .map_err(|e| {
                error!(error = %e, secret_name = %name, "Failed to read secret from Vault");
                SecretsError::vault(name.as_str(), e.to_string())
            })?;

        let secret_string = data.get(SECRET_STRING_FIELD).and_then(Value::as_str);
        let secret_binary = data.get(SECRET_BINARY_FIELD).and_then(Value::as_str);

        if secret_string.is_some() || secret_binary.is_some() {
            return resolve_payload(name, secret_string, secret_binary);
        }

        Ok(Zeroizing::new(Value::Object(data).to_string().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn kv2_response(data: Value) -> Value {
        json!({
            "request_id": "4b3e2b5c-0000-0000-0000-000000000000",
            "lease_id": "",
            "renewable": false,
            "lease_duration": 0,
            "data": {
                "data": data,
                "metadata": {
                    "created_time": "2025-01-01T00:00:00.000000Z",
                    "custom_metadata": null,
                    "deletion_time": "",
                    "destroyed": false,
                    "version": 1
                }
            },
            "wrap_info": null,
            "warnings": null,
            "auth": null
        })
    }

    async fn store_for(server: &MockServer) -> VaultSecretStore {
        VaultSecretStore::new(VaultConfig {
            address: server.uri(),
            token: Some(SecretString::new("test-token")),
            namespace: None,
            mount_path: "secret".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_vault_config_default() {
        let config = VaultConfig::default();
        assert_eq!(config.address, "http://127.0.0.1:8200");
        assert_eq!(config.mount_path, "secret");
        assert!(config.token.is_none());
    }

    #[test]
    fn test_empty_address_rejected() {
        let config = VaultConfig { address: String::new(), ..Default::default() };
        assert!(matches!(VaultSecretStore::new(config), Err(SecretsError::Config { .. })));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = VaultConfig {
            token: Some(SecretString::new("s.very-secret")),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("very-secret"));
    }

    #[tokio::test]
    async fn test_fetch_plain_map() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/secret/data/prod/db"))
            .and(header("X-Vault-Token", "test-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(kv2_response(json!({"host": "h", "port": "3306"}))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        let payload = store.fetch(&SecretName::new("prod/db")).await.unwrap();
        let value: Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(value, json!({"host": "h", "port": "3306"}));
    }

    #[tokio::test]
    async fn test_fetch_mirrored_secret_string() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/secret/data/mirrored"))
            .respond_with(ResponseTemplate::new(200).set_body_json(kv2_response(
                json!({"SecretString": "{\"username\":\"app\"}"}),
            )))
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        let payload = store.fetch(&SecretName::new("mirrored")).await.unwrap();
        assert_eq!(payload.as_slice(), br#"{"username":"app"}"#);
    }

    #[tokio::test]
    async fn test_fetch_forbidden_is_vault_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/secret/data/locked"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"errors": ["permission denied"]})),
            )
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        let err = store.fetch(&SecretName::new("locked")).await.unwrap_err();
        assert!(matches!(err, SecretsError::Vault { ref name, .. } if name == "locked"));
    }
}
