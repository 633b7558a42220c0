//! Canonical encoding of certificate fields.
//!
//! Format: `FIELDS_DOMAIN || CBOR array(organization, candidate, course, identifier)`
//!
//! - Every field is trimmed of leading and trailing whitespace first
//! - Array and text lengths use the smallest valid CBOR header (RFC 8949)
//! - Definite lengths only
//! - Internal whitespace is kept byte for byte
//!
//! Each text item carries its own length, so no two distinct field tuples
//! share an encoding.
//!
//! **This encoding is FROZEN.** Changing it changes every fingerprint.

use ciborium::value::Value;

use crate::error::CoreError;
use crate::types::CertificateFields;

/// Domain separation prefix for the field encoding.
pub const FIELDS_DOMAIN: &[u8] = b"certledger/fields/v1";

const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;

/// Encode fields to canonical bytes.
pub fn canonicalize(fields: &CertificateFields) -> Vec<u8> {
    let parts = fields.trimmed_parts();
    let body_len: usize = parts.iter().map(|p| p.len() + 9).sum();

    let mut buf = Vec::with_capacity(FIELDS_DOMAIN.len() + 1 + body_len);
    buf.extend_from_slice(FIELDS_DOMAIN);
    encode_uint(&mut buf, MAJOR_ARRAY, parts.len() as u64);
    for part in parts {
        encode_text(&mut buf, part);
    }
    buf
}

/// Decode canonical bytes back to fields.
///
/// Rejects a wrong domain, anything other than an array of four text items,
/// and any encoding that would not be produced by [`canonicalize`].
pub fn decode_canonical(bytes: &[u8]) -> Result<CertificateFields, CoreError> {
    let body = bytes
        .strip_prefix(FIELDS_DOMAIN)
        .ok_or_else(|| CoreError::MalformedCanonical("missing domain prefix".into()))?;

    let value: Value =
        ciborium::from_reader(body).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let items = match value {
        Value::Array(items) if items.len() == 4 => items,
        Value::Array(items) => {
            return Err(CoreError::MalformedCanonical(format!(
                "expected 4 fields, got {}",
                items.len()
            )))
        }
        _ => return Err(CoreError::MalformedCanonical("expected array".into())),
    };

    let mut texts = Vec::with_capacity(4);
    for item in items {
        match item {
            Value::Text(s) => texts.push(s),
            _ => return Err(CoreError::MalformedCanonical("expected text field".into())),
        }
    }

    let mut texts = texts.into_iter();
    let mut next = || texts.next().unwrap_or_default();
    let fields = CertificateFields::new(next(), next(), next(), next());

    // Trailing bytes, untrimmed values and oversized length headers all
    // re-encode differently.
    if canonicalize(&fields) != bytes {
        return Err(CoreError::NonCanonical);
    }

    Ok(fields)
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, MAJOR_TEXT, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> CertificateFields {
        CertificateFields::new("Acme University", "Jane Doe", "Distributed Systems", "U1234")
    }

    #[test]
    fn test_canonical_deterministic() {
        assert_eq!(canonicalize(&acme()), canonicalize(&acme()));
    }

    #[test]
    fn test_canonical_layout() {
        let bytes = canonicalize(&CertificateFields::new("A", "B", "C", "D"));
        let mut expected = FIELDS_DOMAIN.to_vec();
        expected.extend_from_slice(&[0x84, 0x61, b'A', 0x61, b'B', 0x61, b'C', 0x61, b'D']);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_canonical_trims_fields() {
        let padded = CertificateFields::new(
            "  Acme University",
            "Jane Doe\t",
            "\nDistributed Systems ",
            " U1234 ",
        );
        assert_eq!(canonicalize(&padded), canonicalize(&acme()));
    }

    #[test]
    fn test_internal_whitespace_is_significant() {
        let double = CertificateFields::new("Acme University", "Jane  Doe", "Distributed Systems", "U1234");
        assert_ne!(canonicalize(&double), canonicalize(&acme()));
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        // Plain concatenation would make these collide.
        let a = CertificateFields::new("ab", "c", "d", "e");
        let b = CertificateFields::new("a", "bc", "d", "e");
        assert_ne!(canonicalize(&a), canonicalize(&b));
    }

    #[test]
    fn test_field_order_is_significant() {
        let a = CertificateFields::new("x", "y", "z", "w");
        let b = CertificateFields::new("y", "x", "z", "w");
        assert_ne!(canonicalize(&a), canonicalize(&b));
    }

    #[test]
    fn test_long_field_uses_wider_header() {
        let long = "x".repeat(300);
        let bytes = canonicalize(&CertificateFields::new(long.as_str(), "b", "c", "d"));
        let body = &bytes[FIELDS_DOMAIN.len()..];
        assert_eq!(body[0], 0x84);
        assert_eq!(body[1], 0x79); // text, 2-byte length
        assert_eq!(&body[2..4], &300u16.to_be_bytes());
    }

    #[test]
    fn test_decode_roundtrip() {
        let fields = CertificateFields::new("Ünïversität", "José  Ñúñez", "Rust", "ID-7");
        let decoded = decode_canonical(&canonicalize(&fields)).unwrap();
        assert_eq!(decoded, fields);
    }

    #[test]
    fn test_decode_rejects_wrong_domain() {
        let mut bytes = canonicalize(&acme());
        bytes[0] ^= 0xff;
        assert!(matches!(
            decode_canonical(&bytes),
            Err(CoreError::MalformedCanonical(_))
        ));
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut bytes = canonicalize(&acme());
        bytes.push(0x00);
        assert_eq!(decode_canonical(&bytes), Err(CoreError::NonCanonical));
    }

    #[test]
    fn test_decode_rejects_untrimmed_value() {
        let mut bytes = FIELDS_DOMAIN.to_vec();
        bytes.extend_from_slice(&[0x84, 0x62, b' ', b'A', 0x61, b'B', 0x61, b'C', 0x61, b'D']);
        assert_eq!(decode_canonical(&bytes), Err(CoreError::NonCanonical));
    }

    #[test]
    fn test_decode_rejects_wrong_arity() {
        let mut bytes = FIELDS_DOMAIN.to_vec();
        bytes.extend_from_slice(&[0x83, 0x61, b'A', 0x61, b'B', 0x61, b'C']);
        assert!(matches!(
            decode_canonical(&bytes),
            Err(CoreError::MalformedCanonical(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_text_item() {
        let mut bytes = FIELDS_DOMAIN.to_vec();
        bytes.extend_from_slice(&[0x84, 0x01, 0x61, b'B', 0x61, b'C', 0x61, b'D']);
        assert!(matches!(
            decode_canonical(&bytes),
            Err(CoreError::MalformedCanonical(_))
        ));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn decode_inverts_canonicalize(
                org in "\\PC{1,40}",
                candidate in "\\PC{1,40}",
                course in "\\PC{1,40}",
                id in "\\PC{1,40}",
            ) {
                let fields = CertificateFields::new(org, candidate, course, id);
                let decoded = decode_canonical(&canonicalize(&fields)).unwrap();
                prop_assert_eq!(decoded, fields.normalized());
            }

            #[test]
            fn truncation_is_rejected(
                name in "[a-z]{1,20}",
                cut in 1usize..8,
            ) {
                let bytes = canonicalize(&CertificateFields::new(name.clone(), name.clone(), name.clone(), name));
                let cut = cut.min(bytes.len() - FIELDS_DOMAIN.len());
                prop_assert!(decode_canonical(&bytes[..bytes.len() - cut]).is_err());
            }
        }
    }
}
