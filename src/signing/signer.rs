//! Credential signing.
//!
//! The signed message is the canonical policy JSON. The signature scheme is
//! fixed by the CDN edge that verifies it: RSA, SHA-1 digest, PKCS#1 v1.5
//! padding. Both policy and signature are carried in CloudFront base64.

use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::{Digest, Sha1};
use tracing::debug;

use super::encoding;
use super::error::{Result, SigningError};
use super::policy::AccessPolicy;

/// Encoded policy, encoded signature and the key pair that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCredential {
    /// CloudFront base64 of the canonical policy bytes
    pub policy: String,
    /// CloudFront base64 of the RSA-SHA1 signature
    pub signature: String,
    /// Identifier of the key pair registered with the distribution
    pub key_pair_id: String,
}

/// Stateless RSA-SHA1 signer.
///
/// Key material is supplied per call and dropped (zeroed) when the call
/// returns. No I/O happens here.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialSigner;

impl CredentialSigner {
    pub fn new() -> Self {
        Self
    }

    /// Sign `policy` with a PEM or DER encoded RSA private key (PKCS#1 or PKCS#8).
    ///
    /// # Errors
    ///
    /// - [`SigningError::InvalidKey`] if the key cannot be parsed
    /// - [`SigningError::Signing`] if the RSA operation fails
    pub fn sign(
        &self,
        policy: &AccessPolicy,
        private_key: &[u8],
        key_pair_id: &str,
    ) -> Result<SignedCredential> {
        let key = parse_private_key(private_key, key_pair_id)?;
        let message = policy.to_canonical_json();
        let digest = Sha1::digest(message.as_bytes());

        let signature = key
            .sign(Pkcs1v15Sign::new::<Sha1>(), &digest)
            .map_err(|e| SigningError::signing(key_pair_id, e.to_string()))?;

        debug!(
            key_pair_id = %key_pair_id,
            resource = %policy.resource(),
            expires_at = policy.expires_at(),
            "Signed access policy"
        );

        Ok(SignedCredential {
            policy: encoding::encode(message.as_bytes()),
            signature: encoding::encode(&signature),
            key_pair_id: key_pair_id.to_string(),
        })
    }

    /// Check `credential` against a PEM public key and return its policy.
    ///
    /// Accepts SubjectPublicKeyInfo (`BEGIN PUBLIC KEY`) and PKCS#1
    /// (`BEGIN RSA PUBLIC KEY`) documents. Expiry is not checked.
    pub fn verify(
        &self,
        credential: &SignedCredential,
        public_key_pem: &str,
    ) -> Result<AccessPolicy> {
        let public_key = RsaPublicKey::from_public_key_pem(public_key_pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(public_key_pem))
            .map_err(|e| SigningError::invalid_key(&credential.key_pair_id, e.to_string()))?;

        let message = encoding::decode(&credential.policy)?;
        let signature = encoding::decode(&credential.signature)?;
        let digest = Sha1::digest(&message);

        public_key.verify(Pkcs1v15Sign::new::<Sha1>(), &digest, &signature).map_err(|_| {
            SigningError::VerificationFailed { key_pair_id: credential.key_pair_id.clone() }
        })?;

        AccessPolicy::from_json(&message)
    }
}

fn parse_private_key(material: &[u8], key_pair_id: &str) -> Result<RsaPrivateKey> {
    if material.is_empty() {
        return Err(SigningError::invalid_key(key_pair_id, "private key material is empty"));
    }

    let parsed = match std::str::from_utf8(material) {
        Ok(pem) if pem.trim_start().starts_with("-----BEGIN") => {
            let pem = pem.trim();
            RsaPrivateKey::from_pkcs1_pem(pem)
                .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
                .map_err(|e| e.to_string())
        }
        _ => RsaPrivateKey::from_pkcs1_der(material)
            .or_else(|_| RsaPrivateKey::from_pkcs8_der(material))
            .map_err(|e| e.to_string()),
    };

    parsed.map_err(|reason| {
        SigningError::invalid_key(key_pair_id, format!("not an RSA private key: {}", reason))
    })
}
