//! Signed-cookie emission.
//!
//! A [`SignedCredential`] travels to the browser as three cookies that share
//! every attribute except name and value:
//!
//! | Cookie                   | Value                       |
//! |--------------------------|-----------------------------|
//! | `CloudFront-Policy`      | encoded canonical policy    |
//! | `CloudFront-Signature`   | encoded RSA-SHA1 signature  |
//! | `CloudFront-Key-Pair-Id` | key pair identifier         |
//!
//! Writing the cookies to an HTTP response is the caller's job;
//! [`CookieSpec::to_set_cookie`] renders a `Set-Cookie` value.

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};

use super::signer::SignedCredential;

pub const POLICY_COOKIE: &str = "CloudFront-Policy";
pub const SIGNATURE_COOKIE: &str = "CloudFront-Signature";
pub const KEY_PAIR_ID_COOKIE: &str = "CloudFront-Key-Pair-Id";

/// SameSite cookie policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSitePolicy {
    Strict,
    Lax,
    None,
}

impl From<SameSitePolicy> for SameSite {
    fn from(policy: SameSitePolicy) -> Self {
        match policy {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        }
    }
}

/// Attributes shared by the three credential cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    /// Cookie domain
    pub domain: String,
    /// Cookie path
    pub path: String,
    /// Cookie expiration, normally the policy expiry
    pub expires: DateTime<Utc>,
    /// Secure flag (HTTPS only)
    pub secure: bool,
    /// HTTP-only flag
    pub http_only: bool,
    /// SameSite setting
    pub same_site: SameSitePolicy,
}

impl CookieAttributes {
    /// Attributes the CDN edge expects: Path `/`, Secure, HttpOnly, SameSite=None.
    pub fn for_distribution(domain: impl Into<String>, expires: DateTime<Utc>) -> Self {
        Self {
            domain: domain.into(),
            path: "/".to_string(),
            expires,
            secure: true,
            http_only: true,
            same_site: SameSitePolicy::None,
        }
    }
}

/// One cookie to set. Built per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSpec {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Cookie expiration
    pub expires: DateTime<Utc>,
    /// Cookie path
    pub path: String,
    /// Cookie domain
    pub domain: String,
    /// Secure flag (HTTPS only)
    pub secure: bool,
    /// HTTP-only flag
    pub http_only: bool,
    /// SameSite setting
    pub same_site: SameSitePolicy,
}

impl CookieSpec {
    fn new(name: &str, value: &str, attributes: &CookieAttributes) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            expires: attributes.expires,
            path: attributes.path.clone(),
            domain: attributes.domain.clone(),
            secure: attributes.secure,
            http_only: attributes.http_only,
            same_site: attributes.same_site,
        }
    }

    /// Build the cookie for a `Set-Cookie` header.
    pub fn to_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.name.clone(), self.value.clone()))
            .domain(self.domain.clone())
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(self.http_only)
            .same_site(self.same_site.into())
            .expires(time::OffsetDateTime::from_unix_timestamp(self.expires.timestamp()).ok())
            .build()
    }

    /// `Set-Cookie` header value.
    pub fn to_set_cookie(&self) -> String {
        self.to_cookie().to_string()
    }
}

/// Converts a signed credential into its three cookies.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieEmitter;

impl CookieEmitter {
    pub fn new() -> Self {
        Self
    }

    /// Emit policy, signature and key-pair-id cookies, in that order.
    pub fn emit(
        &self,
        credential: &SignedCredential,
        attributes: &CookieAttributes,
    ) -> [CookieSpec; 3] {
        [
            CookieSpec::new(POLICY_COOKIE, &credential.policy, attributes),
            CookieSpec::new(SIGNATURE_COOKIE, &credential.signature, attributes),
            CookieSpec::new(KEY_PAIR_ID_COOKIE, &credential.key_pair_id, attributes),
        ]
    }
}
