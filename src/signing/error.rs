//! Error types for the credential-signing pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for signing operations.
pub type Result<T> = std::result::Result<T, SigningError>;

/// Errors raised while building, signing or verifying an access credential.
///
/// Every variant is fatal: the pipeline never yields a partial credential.
#[derive(Error, Debug)]
pub enum SigningError {
    /// Empty resource pattern or an expiry that is not in the future.
    #[error("Invalid policy for resource '{resource}': {reason}")]
    InvalidPolicy { resource: String, reason: String },

    /// Key material could not be parsed as an RSA key.
    #[error("Invalid key for key pair '{key_pair_id}': {reason}")]
    InvalidKey { key_pair_id: String, reason: String },

    /// The cryptographic backend failed.
    #[error("Signing failed for key pair '{key_pair_id}': {reason}")]
    Signing { key_pair_id: String, reason: String },

    /// The private key file could not be read.
    #[error("Private key unavailable at {}: {source}", .path.display())]
    KeyUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The signature does not match the policy under the given public key.
    #[error("Signature verification failed for key pair '{key_pair_id}'")]
    VerificationFailed { key_pair_id: String },

    /// An encoded credential field is not valid.
    #[error("Malformed credential: {reason}")]
    MalformedCredential { reason: String },
}

impl SigningError {
    pub fn invalid_policy(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPolicy { resource: resource.into(), reason: reason.into() }
    }

    pub fn invalid_key(key_pair_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey { key_pair_id: key_pair_id.into(), reason: reason.into() }
    }

    pub fn signing(key_pair_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Signing { key_pair_id: key_pair_id.into(), reason: reason.into() }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedCredential { reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_context() {
        let err =
            SigningError::invalid_policy("https://cdn.example.com/*", "expiry is in the past");
        assert_eq!(
            err.to_string(),
            "Invalid policy for resource 'https://cdn.example.com/*': expiry is in the past"
        );

        let err = SigningError::invalid_key("K2JCJMDEHXQW5F", "not a PEM document");
        assert!(err.to_string().contains("K2JCJMDEHXQW5F"));
    }
}
