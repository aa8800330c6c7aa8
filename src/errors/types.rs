//! # Error Types
//!
//! Crate-level error wrapping the per-module errors using `thiserror`.

use crate::secrets::SecretsError;
use crate::signing::SigningError;

/// Custom result type for edgepass operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for edgepass
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Secret retrieval errors
    #[error(transparent)]
    Secrets(#[from] SecretsError),

    /// Policy, signing and key errors
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// Resource not found errors
    #[error("Resource not found: {resource_type} with ID '{id}'")]
    NotFound { resource_type: String, id: String },
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(source: std::io::Error, context: S) -> Self {
        Self::Io { source, context: context.into() }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource_type: R, id: I) -> Self {
        Self::NotFound { resource_type: resource_type.into(), id: id.into() }
    }

    /// Process exit code for the command line tool
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Config { .. } | Error::Validation { .. } => 78,
            Error::NotFound { .. } => 66,
            Error::Io { .. } => 74,
            Error::Secrets(_) => 69,
            Error::Signing(_) => 65,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::config_with_source("Configuration file could not be parsed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_validation_messages(&errors, "", &mut messages);
        messages.sort();

        Self::validation(format!("Validation failed: {}", messages.join("; ")))
    }
}

/// Flatten nested validation errors into `path.to.field: message` lines.
fn collect_validation_messages(
    errors: &validator::ValidationErrors,
    prefix: &str,
    messages: &mut Vec<String>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path =
            if prefix.is_empty() { field.to_string() } else { format!("{}.{}", prefix, field) };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                messages.push(format!("{}: {}", path, error_messages.join(", ")));
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_validation_messages(nested, &path, messages);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_messages(nested, &format!("{}[{}]", path, index), messages);
                }
            }
        }
    }
}
