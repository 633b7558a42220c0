//! # certledger core
//!
//! Pure primitives for certledger: certificate fields, their canonical
//! encoding, and the fingerprint that identifies an issued certificate.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`CertificateFields`] - The four identity fields of a certificate
//! - [`Fingerprint`] - SHA-256 of the canonical field encoding
//! - [`ContentId`] - Content-addressed identifier of a stored document blob
//!
//! ## Canonicalization
//!
//! Fields are trimmed and encoded as a deterministic CBOR array behind a
//! domain prefix. See the [`canonical`] module.
//!
//! ```rust
//! use certledger_core::{CertificateFields, Fingerprint};
//!
//! let fields = CertificateFields::new("Acme University", "Jane Doe", "Distributed Systems", "U1234");
//! let padded = CertificateFields::new(" Acme University", "Jane Doe ", "Distributed Systems", "U1234");
//! assert_eq!(Fingerprint::of(&fields), Fingerprint::of(&padded));
//! ```

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod types;
pub mod validation;

pub use canonical::{canonicalize, decode_canonical, FIELDS_DOMAIN};
pub use crypto::{fingerprint, multicodec, Sha256Hash};
pub use error::{CoreError, ValidationError};
pub use types::{CertificateFields, ContentId, FieldName, Fingerprint};
pub use validation::{validate_fields, MAX_FIELD_CHARS};
