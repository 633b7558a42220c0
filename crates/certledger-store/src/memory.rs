//! In-memory ledger and blob store.
//!
//! Same semantics as the persistent backends, nothing survives a drop.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use certledger_core::{CertificateFields, ContentId, Fingerprint};

use crate::error::Result;
use crate::traits::{check_consistent, now_millis, BlobStore, Ledger, LedgerRecord, RegisterResult};

/// In-memory ledger. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryLedger {
    records: RwLock<HashMap<Fingerprint, LedgerRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn register(
        &self,
        fingerprint: &Fingerprint,
        fields: &CertificateFields,
        blob_ref: &ContentId,
    ) -> Result<RegisterResult> {
        check_consistent(fingerprint, fields)?;
        let mut records = self.records.write()?;

        if records.contains_key(fingerprint) {
            return Ok(RegisterResult::AlreadyRegistered);
        }

        records.insert(
            *fingerprint,
            LedgerRecord {
                fingerprint: *fingerprint,
                fields: fields.normalized(),
                blob_ref: blob_ref.clone(),
                registered_at: now_millis(),
            },
        );
        Ok(RegisterResult::Registered)
    }

    async fn is_registered(&self, fingerprint: &Fingerprint) -> Result<bool> {
        Ok(self.records.read()?.contains_key(fingerprint))
    }

    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<LedgerRecord>> {
        Ok(self.records.read()?.get(fingerprint).cloned())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.read()?.len() as u64)
    }
}

/// In-memory blob store.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<ContentId, Bytes>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, bytes: Bytes) -> Result<ContentId> {
        let id = ContentId::for_bytes(&bytes);
        self.blobs.write()?.entry(id.clone()).or_insert(bytes);
        Ok(id)
    }

    async fn fetch(&self, id: &ContentId) -> Result<Option<Bytes>> {
        Ok(self.blobs.read()?.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    fn acme() -> CertificateFields {
        CertificateFields::new("Acme University", "Jane Doe", "Distributed Systems", "U1234")
    }

    #[tokio::test]
    async fn test_register_and_query() {
        let ledger = MemoryLedger::new();
        let fields = acme();
        let fp = Fingerprint::of(&fields);
        let blob = ContentId::for_bytes(b"pdf");

        assert!(!ledger.is_registered(&fp).await.unwrap());
        assert_eq!(
            ledger.register(&fp, &fields, &blob).await.unwrap(),
            RegisterResult::Registered
        );
        assert!(ledger.is_registered(&fp).await.unwrap());
        assert_eq!(ledger.count().await.unwrap(), 1);

        let record = ledger.get(&fp).await.unwrap().unwrap();
        assert_eq!(record.fields, fields);
        assert_eq!(record.blob_ref, blob);
    }

    #[tokio::test]
    async fn test_register_is_idempotent_and_write_once() {
        let ledger = MemoryLedger::new();
        let fields = acme();
        let fp = Fingerprint::of(&fields);
        let first = ContentId::for_bytes(b"first");

        ledger.register(&fp, &fields, &first).await.unwrap();
        let again = ledger
            .register(&fp, &fields, &ContentId::for_bytes(b"second"))
            .await
            .unwrap();
        assert_eq!(again, RegisterResult::AlreadyRegistered);
        assert_eq!(ledger.get(&fp).await.unwrap().unwrap().blob_ref, first);
        assert_eq!(ledger.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_register_stores_trimmed_fields() {
        let ledger = MemoryLedger::new();
        let padded = CertificateFields::new(" Acme University ", "Jane Doe", "Distributed Systems", "U1234\n");
        let fp = Fingerprint::of(&padded);
        ledger
            .register(&fp, &padded, &ContentId::for_bytes(b"x"))
            .await
            .unwrap();
        assert_eq!(ledger.get(&fp).await.unwrap().unwrap().fields, acme());
    }

    #[tokio::test]
    async fn test_register_rejects_inconsistent_fingerprint() {
        let ledger = MemoryLedger::new();
        let err = ledger
            .register(&Fingerprint::from_bytes([7; 32]), &acme(), &ContentId::for_bytes(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
        assert_eq!(ledger.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_blob_store_content_addressed() {
        let store = MemoryBlobStore::new();
        let a = store.store(Bytes::from_static(b"hello")).await.unwrap();
        let b = store.store(Bytes::from_static(b"hello")).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a, ContentId::for_bytes(b"hello"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.fetch(&a).await.unwrap().unwrap(), Bytes::from_static(b"hello"));
        assert!(store
            .fetch(&ContentId::for_bytes(b"other"))
            .await
            .unwrap()
            .is_none());
    }
}
