//! # Certledger Store
//!
//! Storage abstraction for certledger: the [`Ledger`] of issued fingerprints
//! and the [`BlobStore`] holding issued documents.
//!
//! ## Key Types
//!
//! - [`Ledger`] - Async trait for the fingerprint registry
//! - [`BlobStore`] - Async trait for content-addressed document storage
//! - [`SqliteLedger`] - SQLite-based persistent ledger
//! - [`FsBlobStore`] - Filesystem blob store
//! - [`MemoryLedger`], [`MemoryBlobStore`] - In-memory backends for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use certledger_core::{CertificateFields, ContentId, Fingerprint};
//! use certledger_store::{Ledger, RegisterResult, SqliteLedger};
//!
//! async fn example() -> certledger_store::Result<()> {
//!     let ledger = SqliteLedger::open("ledger.db")?;
//!
//!     let fields = CertificateFields::new("Acme University", "Jane Doe", "Distributed Systems", "U1234");
//!     let fp = Fingerprint::of(&fields);
//!     let result = ledger.register(&fp, &fields, &ContentId::for_bytes(b"...")).await?;
//!     assert_eq!(result, RegisterResult::Registered);
//!     assert!(ledger.is_registered(&fp).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Idempotent registration**: registering twice returns `AlreadyRegistered`
//! - **Integrity on read**: stored fields are re-hashed and blobs re-addressed
//!   before being returned

pub mod error;
pub mod fs;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use fs::FsBlobStore;
pub use memory::{MemoryBlobStore, MemoryLedger};
pub use sqlite::SqliteLedger;
pub use traits::{BlobStore, Ledger, LedgerRecord, RegisterResult};
