//! The issuance pipeline.
//!
//! validate → fingerprint → ledger pre-check → load mark → compose →
//! upload → register. The mark is loaded and the document composed before
//! anything leaves the process, so asset and layout failures never leave a
//! half-issued certificate behind. Loading and composing touch the
//! filesystem and run on the blocking pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use certledger_core::{validate_fields, CertificateFields, ContentId, Fingerprint};
use certledger_document::{CertificateDocument, Composer, OrganizationMark};
use certledger_store::{BlobStore, Ledger, RegisterResult};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::CertifyConfig;
use crate::error::IssueError;

/// A successfully issued certificate.
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    pub fingerprint: Fingerprint,
    /// Where the document was stored.
    pub content_id: ContentId,
    /// Fields as registered, trimmed.
    pub fields: CertificateFields,
    pub document: CertificateDocument,
}

/// Issues certificates: composes the document, stores it, registers the
/// fingerprint.
pub struct Issuer<L: Ledger, B: BlobStore> {
    ledger: L,
    blobs: B,
    composer: Arc<Composer>,
    scratch_dir: Option<PathBuf>,
}

impl<L: Ledger, B: BlobStore> Issuer<L, B> {
    /// Create an issuer. Fails if the configured title cannot be typeset.
    pub fn new(config: &CertifyConfig, ledger: L, blobs: B) -> Result<Self, IssueError> {
        Ok(Self {
            ledger,
            blobs,
            composer: Arc::new(Composer::new(config.document.clone())?),
            scratch_dir: config.scratch_dir.clone(),
        })
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn blob_store(&self) -> &B {
        &self.blobs
    }

    /// Issue a certificate for `fields`.
    pub async fn issue(&self, fields: &CertificateFields) -> Result<IssuedCertificate, IssueError> {
        validate_fields(fields)?;
        let fields = fields.normalized();
        let fingerprint = Fingerprint::of(&fields);
        debug!(fingerprint = %fingerprint, "issuing certificate");

        if self
            .ledger
            .is_registered(&fingerprint)
            .await
            .map_err(IssueError::LedgerUnavailable)?
        {
            return Err(IssueError::AlreadyRegistered(fingerprint));
        }

        let composer = self.composer.clone();
        let scratch_dir = self.scratch_dir.clone();
        let to_render = fields.clone();
        let (document, written) = tokio::task::spawn_blocking(move || -> Result<_, IssueError> {
            let mark = composer.load_mark()?;
            compose_scoped(&composer, scratch_dir.as_deref(), &to_render, &fingerprint, &mark)
        })
        .await??;

        let content_id = self
            .blobs
            .store(written)
            .await
            .map_err(IssueError::BlobStore)?;

        match self
            .ledger
            .register(&fingerprint, &fields, &content_id)
            .await
            .map_err(IssueError::LedgerUnavailable)?
        {
            RegisterResult::Registered => {}
            RegisterResult::AlreadyRegistered => {
                warn!(fingerprint = %fingerprint, "lost registration race");
                return Err(IssueError::AlreadyRegistered(fingerprint));
            }
        }

        info!(
            fingerprint = %fingerprint,
            content_id = %content_id,
            bytes = document.len(),
            "issued certificate"
        );

        Ok(IssuedCertificate {
            fingerprint,
            content_id,
            fields,
            document,
        })
    }

    /// Compose the document `issue` would produce, without uploading or
    /// registering anything.
    pub fn preview(&self, fields: &CertificateFields) -> Result<CertificateDocument, IssueError> {
        validate_fields(fields)?;
        let fields = fields.normalized();
        let fingerprint = Fingerprint::of(&fields);
        let mark = self.composer.load_mark()?;
        Ok(self.composer.compose(&fields, &fingerprint, &mark)?)
    }
}

/// Compose into a scratch file and read back the bytes to upload.
///
/// The scratch file is removed when this returns, on every path.
fn compose_scoped(
    composer: &Composer,
    scratch_dir: Option<&Path>,
    fields: &CertificateFields,
    fingerprint: &Fingerprint,
    mark: &OrganizationMark,
) -> Result<(CertificateDocument, Bytes), IssueError> {
    let scratch = match scratch_dir {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new()?,
    };
    let document = composer.compose_to(fields, fingerprint, mark, scratch.path())?;
    let written = Bytes::from(std::fs::read(scratch.path())?);
    Ok((document, written))
}
