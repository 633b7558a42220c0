//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use certledger::{CertifyConfig, Issuer, Verifier};
use certledger_core::{CertificateFields, ContentId, Fingerprint};
use certledger_document::DocumentConfig;
use certledger_store::{
    BlobStore, Ledger, LedgerRecord, MemoryBlobStore, MemoryLedger, RegisterResult, StoreError,
};
use image::{ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;

/// The reference certificate used throughout the tests.
pub fn sample_fields() -> CertificateFields {
    CertificateFields::new("Acme University", "Jane Doe", "Distributed Systems", "U1234")
}

/// A small PNG organization mark with a transparent border.
pub fn mark_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([20, 60, 160, 255])
        }
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode mark png");
    out.into_inner()
}

/// Write `logo.png` into `dir`.
pub fn write_mark(dir: &Path) -> std::io::Result<()> {
    std::fs::write(dir.join("logo.png"), mark_png(48, 32))
}

/// Install a test-friendly tracing subscriber. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A test fixture: an assets directory with a mark, and shared in-memory
/// ledger and blob store.
pub struct TestFixture {
    pub dir: TempDir,
    pub config: CertifyConfig,
    pub ledger: Arc<MemoryLedger>,
    pub blobs: Arc<MemoryBlobStore>,
}

impl TestFixture {
    /// Create a fixture with the default template.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a fixture, adjusting the config after the asset paths are set.
    pub fn with_config(adjust: impl FnOnce(&mut CertifyConfig)) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        write_mark(dir.path()).expect("write mark");
        let scratch = dir.path().join("scratch");
        std::fs::create_dir_all(&scratch).expect("create scratch dir");

        let mut config = CertifyConfig {
            document: DocumentConfig {
                assets_dir: dir.path().to_path_buf(),
                ..DocumentConfig::default()
            },
            scratch_dir: Some(scratch),
            ..CertifyConfig::default()
        };
        adjust(&mut config);

        Self {
            dir,
            config,
            ledger: Arc::new(MemoryLedger::new()),
            blobs: Arc::new(MemoryBlobStore::new()),
        }
    }

    /// An issuer over the fixture's ledger and blob store.
    pub fn issuer(&self) -> Issuer<Arc<MemoryLedger>, Arc<MemoryBlobStore>> {
        Issuer::new(&self.config, self.ledger.clone(), self.blobs.clone()).expect("build issuer")
    }

    /// A verifier over the fixture's ledger.
    pub fn verifier(&self) -> Verifier<Arc<MemoryLedger>> {
        Verifier::new(&self.config, self.ledger.clone())
    }

    /// Register fields directly on the ledger, bypassing issuance.
    pub async fn register(&self, fields: &CertificateFields) -> Fingerprint {
        let fp = Fingerprint::of(fields);
        self.ledger
            .register(&fp, fields, &ContentId::for_bytes(b"fixture"))
            .await
            .expect("register fixture");
        fp
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A ledger that is always down.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableLedger;

fn offline() -> StoreError {
    StoreError::Unavailable("ledger offline".into())
}

#[async_trait]
impl Ledger for UnavailableLedger {
    async fn register(
        &self,
        _fingerprint: &Fingerprint,
        _fields: &CertificateFields,
        _blob_ref: &ContentId,
    ) -> certledger_store::Result<RegisterResult> {
        Err(offline())
    }

    async fn is_registered(&self, _fingerprint: &Fingerprint) -> certledger_store::Result<bool> {
        Err(offline())
    }

    async fn get(&self, _fingerprint: &Fingerprint) -> certledger_store::Result<Option<LedgerRecord>> {
        Err(offline())
    }

    async fn count(&self) -> certledger_store::Result<u64> {
        Err(offline())
    }
}

/// A blob store that refuses every upload.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingBlobStore;

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn store(&self, _bytes: Bytes) -> certledger_store::Result<ContentId> {
        Err(StoreError::Unavailable("blob store offline".into()))
    }

    async fn fetch(&self, _id: &ContentId) -> certledger_store::Result<Option<Bytes>> {
        Err(StoreError::Unavailable("blob store offline".into()))
    }
}
