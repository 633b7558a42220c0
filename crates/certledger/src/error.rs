//! Error types for issuance and verification.

use certledger_core::{Fingerprint, ValidationError};
use certledger_document::DocumentError;
use certledger_store::StoreError;
use thiserror::Error;

/// Errors that stop an issuance.
///
/// Everything before [`IssueError::BlobStore`] happens before any upload or
/// registration, so a failed issuance leaves the ledger untouched.
#[derive(Debug, Error)]
pub enum IssueError {
    /// Submitted fields failed validation.
    #[error("invalid fields: {0}")]
    InvalidFields(#[from] ValidationError),

    /// Document composition failed (including a missing organization mark).
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// A certificate with the same fields is already registered.
    #[error("certificate {0} is already registered")]
    AlreadyRegistered(Fingerprint),

    /// The blob store refused or failed the upload.
    #[error("blob store error: {0}")]
    BlobStore(#[source] StoreError),

    /// The ledger could not be queried or written.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(#[source] StoreError),

    /// Scratch file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking composition task panicked or was cancelled.
    #[error("composition task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors that prevent a verification from reaching a verdict.
///
/// A forged or unparseable document is not an error; it is an
/// [`Invalid`](crate::Verdict::Invalid) verdict.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The submitted identifier is empty.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The submitted document exceeds the size limit. Nothing was parsed.
    #[error("document is {size} bytes, limit is {limit}")]
    DocumentTooLarge { size: u64, limit: u64 },

    /// The ledger could not be queried. Says nothing about validity.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(#[source] StoreError),

    /// The submitted file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking extraction task panicked or was cancelled.
    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
