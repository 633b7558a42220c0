//! Field validation for issuance.
//!
//! Verification never validates: it fingerprints whatever a document
//! claims, and the ledger decides.

use crate::error::ValidationError;
use crate::types::{CertificateFields, FieldName};

/// Maximum length of a single field, in characters, after trimming.
pub const MAX_FIELD_CHARS: usize = 256;

/// Validate fields submitted for issuance.
///
/// Checks, per trimmed field:
/// - non-empty
/// - no control characters (every field renders on a single line)
/// - at most [`MAX_FIELD_CHARS`] characters
pub fn validate_fields(fields: &CertificateFields) -> Result<(), ValidationError> {
    for name in FieldName::ALL {
        let value = fields.get(name).trim();

        if value.is_empty() {
            return Err(ValidationError::EmptyField(name));
        }

        if value.chars().any(char::is_control) {
            return Err(ValidationError::ControlCharacter(name));
        }

        let len = value.chars().count();
        if len > MAX_FIELD_CHARS {
            return Err(ValidationError::FieldTooLong {
                field: name,
                len,
                max: MAX_FIELD_CHARS,
            });
        }
    }

    Ok(())
}
