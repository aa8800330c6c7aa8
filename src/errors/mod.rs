//! # Error Handling
//!
//! Each module owns its error enum ([`SecretsError`](crate::secrets::SecretsError),
//! [`SigningError`](crate::signing::SigningError)); [`Error`] wraps them
//! together with configuration and I/O failures for callers that span modules.

pub mod types;

pub use types::{Error, Result};
