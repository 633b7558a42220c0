//! # Certledger Document
//!
//! The visual side of a certificate:
//!
//! - [`OpticalCode`]: QR symbol carrying the fingerprint hex
//! - [`OrganizationMark`]: the issuing organization's logo
//! - [`Composer`]: lays fields, mark and code onto a single PDF page
//! - [`extract`]: reads the four fields back out of a submitted PDF
//!
//! Composer and extractor share one template (see [`template`]). Field
//! values are wrapped in tagged marked-content spans, so extraction finds
//! each field by its tag rather than by where it sits on the page.

pub mod code;
pub mod compose;
pub mod error;
pub mod extract;
pub mod mark;
pub mod template;

pub use code::OpticalCode;
pub use compose::{CertificateDocument, Composer, DocumentConfig};
pub use error::{CodeError, DocumentError, ExtractionError, Result};
pub use extract::{extract, extract_file};
pub use mark::OrganizationMark;
