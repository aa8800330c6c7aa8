//! CloudFront-safe base64.
//!
//! Standard base64 with `+` → `-`, `=` → `_` and `/` → `~`, so encoded values
//! can travel in cookies and query strings without escaping.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::error::{Result, SigningError};

/// Encode `bytes` with the CloudFront alphabet.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD
        .encode(bytes)
        .chars()
        .map(|c| match c {
            '+' => '-',
            '=' => '_',
            '/' => '~',
            other => other,
        })
        .collect()
}

/// Decode a value produced by [`encode`].
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    let standard: String = encoded
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '=',
            '~' => '/',
            other => other,
        })
        .collect();

    STANDARD
        .decode(standard)
        .map_err(|e| SigningError::malformed(format!("invalid CloudFront base64: {}", e)))
}
