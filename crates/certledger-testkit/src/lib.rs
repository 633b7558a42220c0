//! # Certledger Testkit
//!
//! Testing utilities for Certledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed fields with their expected canonical bytes and fingerprints
//! - **Generators**: Proptest strategies for certificate fields
//! - **Documents**: Hand-built and doctored PDFs for verification tests
//! - **Fixtures**: A temp asset directory with in-memory ledger and blob store,
//!   plus collaborators that always fail
//!
//! ## Golden Vectors
//!
//! ```rust
//! use certledger_testkit::vectors::verify_all_vectors;
//!
//! for (name, passed, detail) in verify_all_vectors() {
//!     assert!(passed, "{name}: {detail}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use certledger_core::Fingerprint;
//! use certledger_testkit::generators::certificate_fields;
//!
//! proptest! {
//!     #[test]
//!     fn fingerprint_is_deterministic(fields in certificate_fields()) {
//!         prop_assert_eq!(Fingerprint::of(&fields), Fingerprint::of(&fields));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use certledger_testkit::fixtures::{sample_fields, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let issued = fixture.issuer().issue(&sample_fields()).await?;
//! let verdict = fixture.verifier().verify_by_document(issued.document.as_bytes()).await?;
//! ```

pub mod documents;
pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use documents::{pdf_without_text, strip_field_tags, tamper_field};
pub use fixtures::{
    init_tracing, mark_png, sample_fields, write_mark, FailingBlobStore, TestFixture,
    UnavailableLedger,
};
pub use generators::{certificate_fields, single_char_mutations};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
