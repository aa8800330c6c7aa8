//! The authoritative secret source.

use async_trait::async_trait;
use base64::Engine;
use zeroize::Zeroizing;

use super::error::{Result, SecretsError};
use super::types::SecretName;

/// Fetches a named secret's raw payload from a remote vault.
///
/// Implementations perform one authenticated call per `fetch`: no retry and
/// no caching. Transport and authorization failures surface as
/// [`SecretsError::Vault`] and the caller decides whether to retry.
///
/// # Security Considerations
///
/// - Implementations MUST NOT log the payload
/// - The returned buffer is zeroed on drop
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the raw payload of `name`.
    async fn fetch(&self, name: &SecretName) -> Result<Zeroizing<Vec<u8>>>;
}

#[async_trait]
impl<T: SecretStore + ?Sized> SecretStore for std::sync::Arc<T> {
    async fn fetch(&self, name: &SecretName) -> Result<Zeroizing<Vec<u8>>> {
        (**self).fetch(name).await
    }
}

/// Resolve the payload of a vault answer carrying a string and/or a binary form.
///
/// The string form wins; otherwise the binary form is base64-decoded. A
/// secret with neither yields an empty payload, which the cache rejects.
pub fn resolve_payload(
    name: &SecretName,
    secret_string: Option<&str>,
    secret_binary: Option<&str>,
) -> Result<Zeroizing<Vec<u8>>> {
    if let Some(s) = secret_string {
        return Ok(Zeroizing::new(s.as_bytes().to_vec()));
    }

    match secret_binary {
        Some(encoded) => base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map(Zeroizing::new)
            .map_err(|e| {
                SecretsError::vault(
                    name.as_str(),
                    format!("SecretBinary is not valid base64: {}", e),
                )
            }),
        None => Ok(Zeroizing::new(Vec::new())),
    }
}
