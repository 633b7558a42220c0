//! Error types for the document module.

use std::path::PathBuf;

use certledger_core::{FieldName, Fingerprint};
use thiserror::Error;

/// Errors from generating an optical code.
#[derive(Debug, Error)]
pub enum CodeError {
    /// The payload could not be encoded as a QR symbol.
    #[error("QR encoding failed: {0}")]
    Encode(String),

    /// Rasterizing or PNG-encoding the symbol failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors from composing a certificate document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A required visual asset does not exist.
    #[error("asset not found: {}", .0.display())]
    AssetMissing(PathBuf),

    /// A visual asset exists but could not be decoded.
    #[error("asset {} could not be decoded: {reason}", path.display())]
    AssetInvalid { path: PathBuf, reason: String },

    /// A field contains a character the document fonts cannot show.
    #[error("{field} contains {ch:?}, which the document font cannot encode")]
    UnencodableText { field: FieldName, ch: char },

    /// The configured title contains a character the document fonts cannot show.
    #[error("title contains {0:?}, which the document font cannot encode")]
    UnencodableTitle(char),

    /// The supplied fingerprint was not derived from the supplied fields.
    #[error("fingerprint {supplied} does not match fields (expected {expected})")]
    FingerprintMismatch {
        supplied: Fingerprint,
        expected: Fingerprint,
    },

    /// Optical code generation failed.
    #[error("optical code error: {0}")]
    Code(#[from] CodeError),

    /// PDF serialization failed.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// I/O error writing the document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from extracting fields out of a submitted document.
///
/// A closed set: the verifier reports every variant as a malformed document,
/// never as a tampered one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The bytes are not a readable PDF.
    #[error("document is not a readable PDF: {0}")]
    Unreadable(String),

    /// The PDF has no pages.
    #[error("document has no pages")]
    NoPages,

    /// No page shows any text (for example, a scanned image).
    #[error("document has no text layer")]
    NoTextLayer,

    /// A certificate field marker is absent.
    #[error("document has no {0} field")]
    MissingField(FieldName),

    /// A certificate field marker appears more than once.
    #[error("document has more than one {0} field")]
    DuplicateField(FieldName),

    /// The document exceeds the size limit.
    #[error("document is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },

    /// The document could not be read from disk.
    #[error("document could not be read: {0}")]
    Io(String),
}

/// Result type for document composition.
pub type Result<T> = std::result::Result<T, DocumentError>;
