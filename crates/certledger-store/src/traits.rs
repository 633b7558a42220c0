//! Ledger and BlobStore traits: the abstract interfaces to external storage.
//!
//! The ledger is the authority on which fingerprints were issued. The blob
//! store keeps issued documents, addressed by content. Both are async so
//! that remote backends fit behind the same seam as SQLite and the
//! filesystem.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use certledger_core::{CertificateFields, ContentId, Fingerprint};

use crate::error::Result;

/// Result of registering a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterResult {
    /// The fingerprint was new and is now registered.
    Registered,
    /// The fingerprint was already registered. Nothing changed.
    AlreadyRegistered,
}

/// A registered certificate as the ledger records it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub fingerprint: Fingerprint,
    /// Fields as submitted for issuance, trimmed.
    pub fields: CertificateFields,
    /// Where the issued document is stored.
    pub blob_ref: ContentId,
    /// Registration time (Unix ms).
    pub registered_at: i64,
}

/// Append-only registry of issued fingerprints.
///
/// # Design Notes
///
/// - **Write once**: a registered fingerprint is never removed or replaced.
/// - **Idempotent**: registering a known fingerprint returns
///   `AlreadyRegistered` and leaves the original record untouched.
/// - **Consistent**: `fingerprint` must be the fingerprint of `fields`;
///   implementations reject anything else.
#[async_trait]
pub trait Ledger: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a fingerprint with its fields and document reference.
    async fn register(
        &self,
        fingerprint: &Fingerprint,
        fields: &CertificateFields,
        blob_ref: &ContentId,
    ) -> Result<RegisterResult>;

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Membership test.
    async fn is_registered(&self, fingerprint: &Fingerprint) -> Result<bool>;

    /// Full record for a fingerprint.
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<LedgerRecord>>;

    /// Number of registered fingerprints.
    async fn count(&self) -> Result<u64>;
}

/// Content-addressed document storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes and return their content id. Storing the same bytes twice
    /// returns the same id.
    async fn store(&self, bytes: Bytes) -> Result<ContentId>;

    /// Fetch bytes by content id.
    async fn fetch(&self, id: &ContentId) -> Result<Option<Bytes>>;
}

#[async_trait]
impl<T: Ledger + ?Sized> Ledger for Arc<T> {
    async fn register(
        &self,
        fingerprint: &Fingerprint,
        fields: &CertificateFields,
        blob_ref: &ContentId,
    ) -> Result<RegisterResult> {
        (**self).register(fingerprint, fields, blob_ref).await
    }

    async fn is_registered(&self, fingerprint: &Fingerprint) -> Result<bool> {
        (**self).is_registered(fingerprint).await
    }

    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<LedgerRecord>> {
        (**self).get(fingerprint).await
    }

    async fn count(&self) -> Result<u64> {
        (**self).count().await
    }
}

#[async_trait]
impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    async fn store(&self, bytes: Bytes) -> Result<ContentId> {
        (**self).store(bytes).await
    }

    async fn fetch(&self, id: &ContentId) -> Result<Option<Bytes>> {
        (**self).fetch(id).await
    }
}

/// Reject a registration whose fingerprint was not derived from its fields.
pub(crate) fn check_consistent(
    fingerprint: &Fingerprint,
    fields: &CertificateFields,
) -> Result<()> {
    let expected = Fingerprint::of(fields);
    if expected != *fingerprint {
        return Err(crate::error::StoreError::InvalidData(format!(
            "fingerprint {fingerprint} does not match fields (expected {expected})"
        )));
    }
    Ok(())
}

/// Current time in Unix milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
