//! Time-bounded access policies.
//!
//! A policy grants access to one resource pattern until an epoch-second
//! deadline. Its canonical form is compact JSON with a fixed key order:
//!
//! ```text
//! {"Statement":[{"Resource":"https://cdn.example.com/*","Condition":{"DateLessThan":{"AWS:EpochTime":1767225600}}}]}
//! ```
//!
//! Multi-statement and IP-restricted policies are not supported.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{Result, SigningError};

// Field order of these structs is the canonical key order.

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyDocument {
    #[serde(rename = "Statement")]
    statement: Vec<Statement>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Statement {
    #[serde(rename = "Resource")]
    resource: String,
    #[serde(rename = "Condition")]
    condition: Condition,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Condition {
    #[serde(rename = "DateLessThan")]
    date_less_than: EpochCondition,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct EpochCondition {
    #[serde(rename = "AWS:EpochTime")]
    epoch_time: i64,
}

/// Single-statement policy: `resource` is accessible until `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    resource: String,
    expires_at: i64,
}

impl AccessPolicy {
    /// Resource pattern, e.g. `https://cdn.example.com/*`.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Expiry in epoch seconds.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn expires_at_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }

    /// Canonical serialized form: the exact bytes that get signed.
    pub fn to_canonical_json(&self) -> String {
        let document = PolicyDocument {
            statement: vec![Statement {
                resource: self.resource.clone(),
                condition: Condition {
                    date_less_than: EpochCondition { epoch_time: self.expires_at },
                },
            }],
        };
        // A document of strings and integers always serializes.
        serde_json::to_string(&document).unwrap_or_default()
    }

    /// Parse a serialized policy back into its resource and expiry.
    ///
    /// No time check is applied, so expired policies parse.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let document: PolicyDocument = serde_json::from_slice(bytes)
            .map_err(|e| SigningError::malformed(format!("invalid policy document: {}", e)))?;

        let mut statements = document.statement.into_iter();
        match (statements.next(), statements.next()) {
            (Some(statement), None) => Ok(Self {
                resource: statement.resource,
                expires_at: statement.condition.date_less_than.epoch_time,
            }),
            _ => Err(SigningError::malformed("policy must contain exactly one statement")),
        }
    }
}

/// Builds validated [`AccessPolicy`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyBuilder;

impl PolicyBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build a policy for `resource` valid until `expires_at`.
    ///
    /// # Errors
    ///
    /// - [`SigningError::InvalidPolicy`] if the resource is empty or the expiry
    ///   is not strictly in the future
    pub fn build(&self, resource: &str, expires_at: DateTime<Utc>) -> Result<AccessPolicy> {
        self.build_at(resource, expires_at, Utc::now())
    }

    /// [`build`](Self::build) with an explicit current time.
    pub fn build_at(
        &self,
        resource: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<AccessPolicy> {
        if resource.trim().is_empty() {
            return Err(SigningError::invalid_policy(resource, "resource pattern cannot be empty"));
        }

        if resource.chars().any(char::is_whitespace) {
            return Err(SigningError::invalid_policy(
                resource,
                "resource pattern cannot contain whitespace",
            ));
        }

        if expires_at.timestamp() <= now.timestamp() {
            return Err(SigningError::invalid_policy(
                resource,
                format!(
                    "expiry {} is not after the current time {}",
                    expires_at.timestamp(),
                    now.timestamp()
                ),
            ));
        }

        Ok(AccessPolicy { resource: resource.to_string(), expires_at: expires_at.timestamp() })
    }
}

/// Wildcard resource pattern covering everything under `distribution_url`.
pub fn distribution_wildcard(distribution_url: &str) -> String {
    format!("{}/*", distribution_url.trim_end_matches('/'))
}
