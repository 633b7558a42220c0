//! # Certledger
//!
//! Tamper-evident certificates: issue a document whose fields are bound to
//! a fingerprint on an append-only ledger, and later verify a fingerprint or
//! a submitted document against that ledger.
//!
//! ## Overview
//!
//! - **Fingerprint**: SHA-256 over the canonical encoding of four fields
//!   (organization, candidate, course, identifier)
//! - **Document**: one PDF page showing the fields, the organization mark,
//!   and a QR code carrying the fingerprint
//! - **Ledger**: records which fingerprints were issued
//! - **Blob store**: keeps issued documents, addressed by content
//!
//! Any change to a field changes the fingerprint, so an edited document no
//! longer matches a ledger entry.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use certledger::{CertifyConfig, Issuer, Verifier};
//! use certledger::core::CertificateFields;
//! use certledger::store::{FsBlobStore, SqliteLedger};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CertifyConfig::from_json_file("certledger.json")?;
//!     let ledger = SqliteLedger::open("ledger.db")?;
//!
//!     let issuer = Issuer::new(&config, ledger.clone(), FsBlobStore::open("blobs")?)?;
//!     let fields = CertificateFields::new("Acme University", "Jane Doe", "Distributed Systems", "U1234");
//!     let issued = issuer.issue(&fields).await?;
//!
//!     let verifier = Verifier::new(&config, ledger);
//!     assert!(verifier.verify_by_id(&issued.fingerprint.to_hex()).await?.is_valid());
//!     assert!(verifier.verify_by_document(issued.document.as_bytes()).await?.is_valid());
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `certledger::core` - Fields, canonical encoding, fingerprints
//! - `certledger::document` - QR code, PDF composition and extraction
//! - `certledger::store` - Ledger and blob store backends

pub mod config;
pub mod error;
pub mod issuer;
pub mod verifier;

// Re-export component crates
pub use certledger_core as core;
pub use certledger_document as document;
pub use certledger_store as store;

pub use config::{CertifyConfig, ConfigError, DEFAULT_MAX_DOCUMENT_BYTES};
pub use error::{IssueError, VerifyError};
pub use issuer::{IssuedCertificate, Issuer};
pub use verifier::{InvalidReason, VerificationStage, Verdict, Verifier};

pub use certledger_core::{CertificateFields, ContentId, FieldName, Fingerprint};
