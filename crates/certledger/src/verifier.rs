//! Verification coordinator.
//!
//! Two entry points reach the same question, "is this fingerprint on the
//! ledger?":
//!
//! - by id: the fingerprint is typed or scanned in and checked as is
//! - by document: fields are extracted, re-canonicalized and re-hashed
//!
//! Every outcome the submitter can cause is a [`Verdict`]. Only problems on
//! our side of the boundary, an empty id or an oversize document, are a
//! [`VerifyError`]. In particular a ledger outage is never reported as
//! `Invalid`.

use std::fmt;
use std::path::Path;

use certledger_core::{CertificateFields, Fingerprint};
use certledger_document::{extract, extract_file, ExtractionError};
use certledger_store::{Ledger, LedgerRecord};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::CertifyConfig;
use crate::error::VerifyError;

/// Stages a document verification passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStage {
    Received,
    Extracting,
    Fingerprinting,
    CheckingLedger,
}

impl fmt::Display for VerificationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VerificationStage::Received => "received",
            VerificationStage::Extracting => "extracting",
            VerificationStage::Fingerprinting => "fingerprinting",
            VerificationStage::CheckingLedger => "checking ledger",
        })
    }
}

/// Why a certificate was judged invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    /// The document could not be read as a certificate.
    MalformedDocument(ExtractionError),
    /// The fingerprint is not on the ledger: never issued, or fields altered.
    NotRegistered,
}

impl InvalidReason {
    /// Extraction detail, for diagnostics.
    pub fn extraction_error(&self) -> Option<&ExtractionError> {
        match self {
            InvalidReason::MalformedDocument(e) => Some(e),
            InvalidReason::NotRegistered => None,
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::MalformedDocument(_) => f.write_str("malformed document"),
            InvalidReason::NotRegistered => f.write_str("not registered or tampered"),
        }
    }
}

/// Outcome of a verification. Strictly binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid {
        fingerprint: Fingerprint,
        /// Extracted fields, when verifying a document.
        fields: Option<CertificateFields>,
    },
    Invalid {
        reason: InvalidReason,
        /// The fingerprint that was checked, if one was computed.
        fingerprint: Option<Fingerprint>,
    },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid { .. })
    }

    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            Verdict::Valid { fingerprint, .. } => Some(fingerprint),
            Verdict::Invalid { fingerprint, .. } => fingerprint.as_ref(),
        }
    }

    pub fn reason(&self) -> Option<&InvalidReason> {
        match self {
            Verdict::Valid { .. } => None,
            Verdict::Invalid { reason, .. } => Some(reason),
        }
    }
}

/// Verifies certificates against a ledger.
///
/// Holds no per-request state; every call asks the ledger afresh.
pub struct Verifier<L: Ledger> {
    ledger: L,
    max_document_bytes: u64,
}

impl<L: Ledger> Verifier<L> {
    pub fn new(config: &CertifyConfig, ledger: L) -> Self {
        Self {
            ledger,
            max_document_bytes: config.max_document_bytes,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn max_document_bytes(&self) -> u64 {
        self.max_document_bytes
    }

    /// Verify a fingerprint given as text (typed, pasted or scanned).
    ///
    /// Only an empty id is an error. Text that is not a fingerprint can
    /// never be on the ledger, so it is judged `Invalid` without a lookup.
    pub async fn verify_by_id(&self, id: &str) -> Result<Verdict, VerifyError> {
        let verdict = match parse_id(id)? {
            Some(fingerprint) => {
                debug!(fingerprint = %fingerprint, "verifying by id");
                self.check_ledger(fingerprint, None).await?
            }
            None => Verdict::Invalid {
                reason: InvalidReason::NotRegistered,
                fingerprint: None,
            },
        };
        log_verdict(&verdict);
        Ok(verdict)
    }

    /// Verify a submitted document.
    ///
    /// Parsing runs on the blocking pool.
    pub async fn verify_by_document(&self, bytes: &[u8]) -> Result<Verdict, VerifyError> {
        stage(VerificationStage::Received);
        check_size(bytes.len() as u64, self.max_document_bytes)?;

        stage(VerificationStage::Extracting);
        let owned = bytes.to_vec();
        let extracted = tokio::task::spawn_blocking(move || extract(&owned)).await?;
        self.finish_document(extracted).await
    }

    /// Verify a submitted document file. The size limit is checked against
    /// file metadata before any bytes are read.
    pub async fn verify_document_file(&self, path: &Path) -> Result<Verdict, VerifyError> {
        stage(VerificationStage::Received);
        let path = path.to_path_buf();
        let limit = self.max_document_bytes;

        let extracted = tokio::task::spawn_blocking(move || -> Result<_, VerifyError> {
            check_size(std::fs::metadata(&path)?.len(), limit)?;
            stage(VerificationStage::Extracting);
            Ok(extract_file(&path, limit))
        })
        .await??;

        match extracted {
            // The file grew between the metadata check and the read.
            Err(ExtractionError::TooLarge { size, limit }) => {
                Err(VerifyError::DocumentTooLarge { size, limit })
            }
            Err(ExtractionError::Io(msg)) => Err(VerifyError::Io(std::io::Error::other(msg))),
            result => self.finish_document(result).await,
        }
    }

    /// The ledger record behind a fingerprint, for display. Text that is not
    /// a fingerprint has no record.
    pub async fn lookup(&self, id: &str) -> Result<Option<LedgerRecord>, VerifyError> {
        let Some(fingerprint) = parse_id(id)? else {
            return Ok(None);
        };
        self.ledger
            .get(&fingerprint)
            .await
            .map_err(VerifyError::LedgerUnavailable)
    }

    async fn finish_document(
        &self,
        extracted: Result<CertificateFields, ExtractionError>,
    ) -> Result<Verdict, VerifyError> {
        let fields = match extracted {
            Ok(fields) => fields,
            Err(e) => {
                let verdict = Verdict::Invalid {
                    reason: InvalidReason::MalformedDocument(e),
                    fingerprint: None,
                };
                log_verdict(&verdict);
                return Ok(verdict);
            }
        };

        stage(VerificationStage::Fingerprinting);
        let fingerprint = Fingerprint::of(&fields);

        let verdict = self.check_ledger(fingerprint, Some(fields)).await?;
        log_verdict(&verdict);
        Ok(verdict)
    }

    async fn check_ledger(
        &self,
        fingerprint: Fingerprint,
        fields: Option<CertificateFields>,
    ) -> Result<Verdict, VerifyError> {
        stage(VerificationStage::CheckingLedger);
        let registered = self.ledger.is_registered(&fingerprint).await.map_err(|e| {
            warn!(fingerprint = %fingerprint, error = %e, "ledger unavailable");
            VerifyError::LedgerUnavailable(e)
        })?;

        Ok(if registered {
            Verdict::Valid {
                fingerprint,
                fields,
            }
        } else {
            Verdict::Invalid {
                reason: InvalidReason::NotRegistered,
                fingerprint: Some(fingerprint),
            }
        })
    }
}

/// Parse a user-supplied fingerprint. Surrounding whitespace is ignored.
///
/// `Ok(None)` for text that is not 64 hex digits.
fn parse_id(id: &str) -> Result<Option<Fingerprint>, VerifyError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(VerifyError::MalformedInput(
            "certificate id is empty".into(),
        ));
    }
    match Fingerprint::from_hex(id) {
        Ok(fingerprint) => Ok(Some(fingerprint)),
        Err(e) => {
            debug!(error = %e, "certificate id is not a fingerprint");
            Ok(None)
        }
    }
}

fn check_size(size: u64, limit: u64) -> Result<(), VerifyError> {
    if size > limit {
        warn!(size, limit, "document rejected: too large");
        return Err(VerifyError::DocumentTooLarge { size, limit });
    }
    Ok(())
}

fn stage(stage: VerificationStage) {
    debug!(stage = %stage, "verification stage");
}

fn log_verdict(verdict: &Verdict) {
    match verdict {
        Verdict::Valid { fingerprint, .. } => {
            info!(fingerprint = %fingerprint, "certificate valid");
        }
        Verdict::Invalid {
            reason,
            fingerprint,
        } => {
            let detail = reason
                .extraction_error()
                .map(ToString::to_string)
                .unwrap_or_default();
            match fingerprint {
                Some(fp) => info!(fingerprint = %fp, reason = %reason, "certificate invalid"),
                None => info!(reason = %reason, detail = %detail, "certificate invalid"),
            }
        }
    }
}
