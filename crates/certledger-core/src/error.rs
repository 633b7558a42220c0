//! Error types for certledger core.

use thiserror::Error;

use crate::types::FieldName;

/// Errors from parsing or decoding core primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    #[error("invalid content id: {0}")]
    InvalidContentId(String),

    #[error("malformed canonical encoding: {0}")]
    MalformedCanonical(String),

    #[error("decoding error: {0}")]
    DecodingError(String),

    #[error("encoding is not canonical")]
    NonCanonical,
}

/// Validation errors for certificate fields submitted for issuance.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is empty")]
    EmptyField(FieldName),

    #[error("{0} contains a control character")]
    ControlCharacter(FieldName),

    #[error("{field} is {len} characters, maximum is {max}")]
    FieldTooLong {
        field: FieldName,
        len: usize,
        max: usize,
    },
}

impl ValidationError {
    /// The field that failed validation.
    pub fn field(&self) -> FieldName {
        match self {
            ValidationError::EmptyField(field) | ValidationError::ControlCharacter(field) => *field,
            ValidationError::FieldTooLong { field, .. } => *field,
        }
    }
}
