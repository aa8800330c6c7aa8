//! `edgepass verify`: check a signed credential offline.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use super::output::{print_json, print_rows, OutputFormat};
use crate::errors::Error;
use crate::signing::{CredentialSigner, SignedCredential};

#[derive(Debug, Serialize)]
struct VerifyOutput<'a> {
    valid: bool,
    resource: &'a str,
    expires_at: i64,
    expired: bool,
}

pub async fn handle_verify_command(
    public_key: &Path,
    policy: String,
    signature: String,
    key_pair_id: Option<String>,
    output: OutputFormat,
) -> Result<()> {
    let public_key_pem = tokio::fs::read_to_string(public_key)
        .await
        .with_context(|| format!("Failed to read public key {}", public_key.display()))?;

    let credential =
        SignedCredential { policy, signature, key_pair_id: key_pair_id.unwrap_or_default() };
    let policy = CredentialSigner::new()
        .verify(&credential, &public_key_pem)
        .map_err(Error::from)
        .context("Credential did not verify")?;

    let expired = policy.expires_at() <= Utc::now().timestamp();
    match output {
        OutputFormat::Text => {
            let expires = policy
                .expires_at_datetime()
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| policy.expires_at().to_string());
            print_rows(&[
                ("signature", "valid".to_string()),
                ("resource", policy.resource().to_string()),
                ("expires", expires),
                ("expired", expired.to_string()),
            ]);
        }
        OutputFormat::Json => print_json(&VerifyOutput {
            valid: true,
            resource: policy.resource(),
            expires_at: policy.expires_at(),
            expired,
        })?,
    }

    Ok(())
}
