//! Error types for registry setup and configuration loading.
//!
//! Validation findings are not errors in this sense; they are returned as
//! lists of [`FormValidationError`](form_schema_core::FormValidationError).

use thiserror::Error;

/// Errors raised while building or editing a
/// [`DatatypeRegistry`](crate::DatatypeRegistry).
///
/// They are expected only during application setup and are not retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The identifier is already registered.
    #[error("form-schema: datatype already exists: {0}")]
    Duplicate(String),

    /// No datatype is registered under the identifier.
    #[error("form-schema: datatype not found: {0}")]
    NotFound(String),

    /// The declared parent is unknown or disagrees on `allowsSubfields`.
    #[error("form-schema: invalid parent datatype '{parent}' for '{identifier}'")]
    InvalidParent { identifier: String, parent: String },

    /// Another datatype still inherits from this one.
    #[error("form-schema: datatype '{identifier}' is parent of '{child}'")]
    IsParent { identifier: String, child: String },
}

/// Convenience alias for registry results.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors raised while reading or writing a
/// [`ValidatorConfig`](crate::ValidatorConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}
