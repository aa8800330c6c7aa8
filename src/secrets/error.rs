//! Error types for secret retrieval.

use thiserror::Error;

/// Result type for secrets operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Errors that can occur while resolving a secret.
///
/// Only [`SecretsError::CacheTransport`] is recoverable inside the cache-aside
/// path: the shared cache is an optimisation and the vault stays authoritative.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// The vault was unreachable, refused the credentials, or failed the call.
    #[error("Vault error for secret '{name}': {message}")]
    Vault { name: String, message: String },

    /// The shared cache could not be reached or timed out.
    #[error("Shared cache transport error: {message}")]
    CacheTransport { message: String },

    /// A payload was not a JSON object of scalar values.
    #[error("Failed to decode secret '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The vault answered but the secret carried no data.
    #[error("Vault returned empty data for secret '{name}'")]
    EmptySecret { name: String },

    /// A decoded record lacks a field its consumer requires.
    #[error("Secret record is missing required field '{field}'")]
    MissingField { field: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl SecretsError {
    /// Create a vault error.
    pub fn vault(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Vault { name: name.into(), message: message.into() }
    }

    /// Create a shared cache transport error.
    pub fn cache_transport(message: impl Into<String>) -> Self {
        Self::CacheTransport { message: message.into() }
    }

    /// Create a decode error.
    pub fn decode(name: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode { name: name.into(), source }
    }

    /// Create an empty secret error.
    pub fn empty_secret(name: impl Into<String>) -> Self {
        Self::EmptySecret { name: name.into() }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    /// Create a config error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Whether this error must abort a secret lookup.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::CacheTransport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = SecretsError::vault("db/primary", "403 permission denied");
        assert!(matches!(err, SecretsError::Vault { .. }));
        assert_eq!(err.to_string(), "Vault error for secret 'db/primary': 403 permission denied");

        let err = SecretsError::empty_secret("db/primary");
        assert!(matches!(err, SecretsError::EmptySecret { .. }));
        assert!(err.to_string().contains("db/primary"));
    }

    #[test]
    fn test_only_cache_transport_is_recoverable() {
        assert!(!SecretsError::cache_transport("connection refused").is_fatal());
        assert!(SecretsError::vault("x", "timeout").is_fatal());
        assert!(SecretsError::empty_secret("x").is_fatal());

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(SecretsError::decode("x", source).is_fatal());
    }
}
