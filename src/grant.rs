//! # Access Grants
//!
//! Issues signed cookies for a configured CDN resource:
//!
//! ```text
//! grant("media", ttl) → read private key → policy(distribution_url + "/*", now + ttl)
//!                     → sign → [CloudFront-Policy, CloudFront-Signature, CloudFront-Key-Pair-Id]
//! ```
//!
//! The private key is read from disk on every grant and zeroed after signing,
//! so key rotation only requires replacing the file.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::config::{AppConfig, ResourceConfig};
use crate::errors::{Error, Result};
use crate::signing::{
    distribution_wildcard, AccessPolicy, CookieAttributes, CookieEmitter, CookieSpec,
    CredentialSigner, PolicyBuilder, SignedCredential, SigningError,
};

/// Result of a successful grant.
#[derive(Debug, Clone)]
pub struct AccessGrant {
    /// Name of the configured resource
    pub resource_name: String,
    /// The policy that was signed
    pub policy: AccessPolicy,
    /// Encoded policy, signature and key pair id
    pub credential: SignedCredential,
    /// Cookies to set, in policy, signature, key-pair-id order
    pub cookies: [CookieSpec; 3],
}

impl AccessGrant {
    /// `Set-Cookie` header values for all three cookies.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.cookies.iter().map(CookieSpec::to_set_cookie).collect()
    }
}

/// Issues access grants for named resources.
#[derive(Debug, Clone)]
pub struct AccessGrantService {
    resources: BTreeMap<String, ResourceConfig>,
    policy_builder: PolicyBuilder,
    signer: CredentialSigner,
    emitter: CookieEmitter,
}

impl AccessGrantService {
    pub fn new(resources: BTreeMap<String, ResourceConfig>) -> Self {
        Self {
            resources,
            policy_builder: PolicyBuilder::new(),
            signer: CredentialSigner::new(),
            emitter: CookieEmitter::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.resources.clone())
    }

    /// Grant access to every object under the resource's distribution.
    ///
    /// `ttl` defaults to the resource's `default_ttl_secs`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if no resource has this name
    /// - [`SigningError::KeyUnavailable`] if the private key file cannot be read
    /// - any other [`SigningError`] from policy building or signing
    pub async fn grant(&self, name: &str, ttl: Option<Duration>) -> Result<AccessGrant> {
        self.grant_at(name, ttl, Utc::now()).await
    }

    /// [`grant`](Self::grant) with an explicit issue time.
    pub async fn grant_at(
        &self,
        name: &str,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<AccessGrant> {
        let resource = self.resources.get(name).ok_or_else(|| Error::not_found("resource", name))?;
        let pattern = distribution_wildcard(&resource.distribution_url);

        let ttl = ttl.unwrap_or_else(|| resource.default_ttl());
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|_| SigningError::invalid_policy(&pattern, "lifetime is out of range"))?;
        let expires = now
            .checked_add_signed(ttl)
            .ok_or_else(|| SigningError::invalid_policy(&pattern, "expiry is out of range"))?;

        let policy = self.policy_builder.build_at(&pattern, expires, now)?;

        let private_key = read_private_key(resource).await?;
        let credential = self.signer.sign(&policy, &private_key, &resource.key_pair_id)?;
        drop(private_key);

        let attributes = CookieAttributes::for_distribution(&resource.cookie_domain, expires);
        let cookies = self.emitter.emit(&credential, &attributes);

        info!(
            resource_name = %name,
            resource = %pattern,
            key_pair_id = %resource.key_pair_id,
            expires_at = policy.expires_at(),
            "Issued access grant"
        );

        Ok(AccessGrant { resource_name: name.to_string(), policy, credential, cookies })
    }
}

async fn read_private_key(resource: &ResourceConfig) -> Result<Zeroizing<Vec<u8>>> {
    let path = &resource.private_key_path;
    debug!(path = %path.display(), key_pair_id = %resource.key_pair_id, "Reading private key");

    tokio::fs::read(path).await.map(Zeroizing::new).map_err(|source| {
        Error::from(SigningError::KeyUnavailable { path: path.clone(), source })
    })
}
