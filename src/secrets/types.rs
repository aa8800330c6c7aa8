//! Secure types for handling secret names, values, and records.
//!
//! [`SecretString`] and [`SecretRecord`] never expose their contents through
//! `Debug`, `Display`, or logging. Values are zeroed when dropped.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::{Result, SecretsError};

/// Key namespace used for secrets in the shared cache.
pub const CACHE_KEY_PREFIX: &str = "secret:";

/// Opaque, immutable identifier of a secret in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecretName(String);

impl SecretName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shared cache key for this secret: `secret:<name>`.
    pub fn cache_key(&self) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, self.0)
    }
}

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SecretName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SecretName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for SecretName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A string wrapper that redacts its contents in Debug and Display.
///
/// - Debug output shows `SecretString([REDACTED])`
/// - Display output shows `[REDACTED]`
/// - Memory is zeroed when dropped
/// - The value is only reachable through [`SecretString::expose_secret`]
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(SecretString(value))
    }
}

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the underlying secret value.
    ///
    /// Only call this where the raw value is consumed (signing, connection
    /// strings, cache write-back). Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// String-keyed record decoded from a vault JSON payload.
///
/// The schema belongs to the consumer. Scalar JSON values are kept as their
/// string form (`3306` becomes `"3306"`), nested values as compact JSON and
/// `null` entries are dropped.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretRecord {
    fields: BTreeMap<String, SecretString>,
}

impl SecretRecord {
    /// Decode a record from raw JSON bytes.
    ///
    /// Fails with [`SecretsError::Decode`] when the payload is not a JSON object.
    pub fn from_json(name: &SecretName, payload: &[u8]) -> Result<Self> {
        let map: Map<String, Value> = serde_json::from_slice(payload)
            .map_err(|e| SecretsError::decode(name.as_str(), e))?;
        Ok(Self::from_map(map))
    }

    fn from_map(map: Map<String, Value>) -> Self {
        let fields = map
            .into_iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    Value::Null => return None,
                    Value::String(s) => s,
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    nested => nested.to_string(),
                };
                Some((key, SecretString::new(value)))
            })
            .collect();
        Self { fields }
    }

    /// Serialize the record back to compact JSON for the shared cache.
    pub fn to_json(&self) -> String {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.expose_secret().to_string())))
            .collect();
        Value::Object(map).to_string()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(SecretString::expose_secret)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SecretString>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields.keys().map(|k| (k, "[REDACTED]"))).finish()
    }
}

impl<K: Into<String>, V: Into<SecretString>> FromIterator<(K, V)> for SecretRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let fields = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { fields }
    }
}
