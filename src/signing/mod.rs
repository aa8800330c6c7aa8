//! # Access Credential Signing
//!
//! Turns a resource pattern and an expiry into the signed cookies a CDN edge
//! accepts as proof of access.
//!
//! ```text
//! PolicyBuilder → AccessPolicy → CredentialSigner → SignedCredential → CookieEmitter
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::{Duration, Utc};
//! use edgepass::signing::{CookieAttributes, CookieEmitter, CredentialSigner, PolicyBuilder};
//!
//! # fn example(private_key_pem: &[u8]) -> edgepass::signing::Result<()> {
//! let expires = Utc::now() + Duration::seconds(1800);
//! let policy = PolicyBuilder::new().build("https://cdn.example.com/*", expires)?;
//! let credential = CredentialSigner::new().sign(&policy, private_key_pem, "K2JCJMDEHXQW5F")?;
//!
//! let attributes = CookieAttributes::for_distribution("cdn.example.com", expires);
//! for cookie in CookieEmitter::new().emit(&credential, &attributes) {
//!     println!("Set-Cookie: {}", cookie.to_set_cookie());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Security
//!
//! - Private key bytes are owned by the caller and never logged
//! - Policies are signed exactly as serialized; no re-encoding happens in between

pub mod cookies;
pub mod encoding;
pub mod error;
pub mod policy;
pub mod signer;

#[cfg(test)]
pub(crate) mod test_keys;

pub use cookies::{
    CookieAttributes, CookieEmitter, CookieSpec, SameSitePolicy, KEY_PAIR_ID_COOKIE,
    POLICY_COOKIE, SIGNATURE_COOKIE,
};
pub use error::{Result, SigningError};
pub use policy::{distribution_wildcard, AccessPolicy, PolicyBuilder};
pub use signer::{CredentialSigner, SignedCredential};
