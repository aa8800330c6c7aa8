//! `edgepass sign`: issue signed cookies for a configured resource.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use super::output::{print_json, OutputFormat};
use crate::config::AppConfig;
use crate::grant::{AccessGrant, AccessGrantService};

#[derive(Debug, Serialize)]
struct CookieOutput<'a> {
    name: &'a str,
    value: &'a str,
    set_cookie: String,
}

#[derive(Debug, Serialize)]
struct GrantOutput<'a> {
    resource_name: &'a str,
    resource: &'a str,
    expires_at: i64,
    cookies: Vec<CookieOutput<'a>>,
}

impl<'a> From<&'a AccessGrant> for GrantOutput<'a> {
    fn from(grant: &'a AccessGrant) -> Self {
        Self {
            resource_name: &grant.resource_name,
            resource: grant.policy.resource(),
            expires_at: grant.policy.expires_at(),
            cookies: grant
                .cookies
                .iter()
                .map(|cookie| CookieOutput {
                    name: &cookie.name,
                    value: &cookie.value,
                    set_cookie: cookie.to_set_cookie(),
                })
                .collect(),
        }
    }
}

pub async fn handle_sign_command(
    config: &AppConfig,
    resource: &str,
    ttl_secs: Option<u64>,
    output: OutputFormat,
) -> Result<()> {
    let service = AccessGrantService::from_config(config);
    let grant = service
        .grant(resource, ttl_secs.map(Duration::from_secs))
        .await
        .with_context(|| format!("Failed to issue access grant for resource '{}'", resource))?;

    match output {
        OutputFormat::Text => {
            for header in grant.set_cookie_headers() {
                println!("Set-Cookie: {}", header);
            }
        }
        OutputFormat::Json => print_json(&GrantOutput::from(&grant))?,
    }

    Ok(())
}
