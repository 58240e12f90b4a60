//! Error types for schema construction and record validation.

use thiserror::Error;

/// Errors raised while building a schema or parsing a record against it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema itself is malformed (empty key, no children, duplicate keys).
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// The record carries keys the schema does not declare.
    #[error("Unknown field(s): {}", keys.join(", "))]
    UnknownField { keys: Vec<String> },

    /// A required key is absent from the record.
    #[error("Missing required field: {key}")]
    MissingRequiredField { key: String },

    /// The value has the right shape but fails a constraint.
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// The value has the wrong JSON type.
    #[error("Field '{key}' must be {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

impl SchemaError {
    /// Create an invalid schema error
    pub fn invalid_schema(msg: impl Into<String>) -> Self {
        Self::InvalidSchema(msg.into())
    }

    /// Create an invalid value error
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(key: impl Into<String>, expected: &'static str) -> Self {
        Self::TypeMismatch {
            key: key.into(),
            expected,
        }
    }
}
