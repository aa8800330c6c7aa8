//! Typed view of a database credential record.
//!
//! Services bootstrap their database connection from a secret shaped like
//! `{"host": .., "port": .., "dbname": .., "username": .., "password": ..}`.

use std::fmt;

use super::error::{Result, SecretsError};
use super::types::{SecretRecord, SecretString};

/// Port used when the record carries none.
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Database connection credentials extracted from a [`SecretRecord`].
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseCredentials {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub username: String,
    pub password: SecretString,
}

impl DatabaseCredentials {
    /// Extract credentials from a record.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::MissingField`] if `host`, `dbname`, `username` or
    ///   `password` is absent or blank
    /// - [`SecretsError::Config`] if `port` is not a valid port number
    pub fn from_record(record: &SecretRecord) -> Result<Self> {
        let port = match record.get("port").map(str::trim) {
            None | Some("") => DEFAULT_MYSQL_PORT,
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                SecretsError::config_error(format!("Invalid database port '{}'", raw))
            })?,
        };

        Ok(Self {
            host: required(record, "host")?.to_string(),
            port,
            dbname: required(record, "dbname")?.to_string(),
            username: required(record, "username")?.to_string(),
            password: SecretString::new(required(record, "password")?),
        })
    }

    /// PDO-style data source name. Credentials are not part of it.
    pub fn dsn(&self) -> String {
        format!("mysql:host={};port={};dbname={}", self.host, self.port, self.dbname)
    }
}

fn required<'a>(record: &'a SecretRecord, field: &str) -> Result<&'a str> {
    record
        .get(field)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| SecretsError::missing_field(field))
}

impl fmt::Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("username", &self.username)
            .field("password", &self.password)
            .finish()
    }
}
