//! # edgepass
//!
//! Two pieces of access plumbing for services sitting behind a CDN:
//!
//! - **Signed access cookies**: a time-bounded policy for a distribution,
//!   signed with the distribution's RSA key and delivered as the
//!   `CloudFront-Policy` / `CloudFront-Signature` / `CloudFront-Key-Pair-Id`
//!   cookie triple ([`signing`], [`grant`]).
//! - **Cache-aside secret lookup**: named secrets resolved through a
//!   process-local memo, a shared TTL cache and finally the vault
//!   ([`secrets`]).
//!
//! ## Architecture
//!
//! ```text
//! AccessGrantService ─→ PolicyBuilder ─→ CredentialSigner ─→ CookieEmitter
//!        │
//!   ResourceConfig (distribution URL, key file, key pair id, cookie domain)
//!
//! SecretCache ─→ memo ─→ SharedCache ("secret:<name>", TTL) ─→ SecretStore (Vault)
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use edgepass::{AccessGrantService, AppConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::load("edgepass.toml")?;
//!     let grants = AccessGrantService::from_config(&config);
//!     let grant = grants.grant("media", None).await?;
//!     for header in grant.set_cookie_headers() {
//!         println!("Set-Cookie: {}", header);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod grant;
pub mod observability;
pub mod secrets;
pub mod signing;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{Error, Result};
pub use grant::{AccessGrant, AccessGrantService};
pub use observability::init_logging;
