//! Field extraction from submitted documents.
//!
//! Extraction is keyed on the marked-content tags the composer writes around
//! each field value, never on line positions. Text outside a tagged span is
//! ignored, so edits to the fixed wording cannot shift fields into each
//! other's place.

use std::collections::BTreeMap;
use std::path::Path;

use certledger_core::{CertificateFields, FieldName};
use lopdf::content::Content;
use lopdf::{Document, Object};
use tracing::{debug, trace};

use crate::error::ExtractionError;
use crate::template::{decode_text, field_for_tag};

/// Kerning beyond this (in 1/1000 em) inside a TJ array reads as a space.
const TJ_SPACE_THRESHOLD: f32 = -250.0;

/// Extract the four certificate fields from PDF bytes.
pub fn extract(bytes: &[u8]) -> Result<CertificateFields, ExtractionError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::Unreadable(e.to_string()))?;

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(ExtractionError::NoPages);
    }

    let mut collector = FieldCollector::default();
    for (number, page_id) in pages {
        let raw = doc
            .get_page_content(page_id)
            .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;
        let content =
            Content::decode(&raw).map_err(|e| ExtractionError::Unreadable(e.to_string()))?;
        trace!(page = number, ops = content.operations.len(), "scanning page");

        for op in &content.operations {
            collector.apply(&op.operator, &op.operands)?;
        }
    }

    collector.finish()
}

/// Extract from a file on disk, refusing anything larger than `limit` bytes
/// before reading it.
pub fn extract_file(path: &Path, limit: u64) -> Result<CertificateFields, ExtractionError> {
    let size = std::fs::metadata(path)
        .map_err(|e| ExtractionError::Io(e.to_string()))?
        .len();
    if size > limit {
        return Err(ExtractionError::TooLarge { size, limit });
    }
    let bytes = std::fs::read(path).map_err(|e| ExtractionError::Io(e.to_string()))?;
    extract(&bytes)
}

#[derive(Default)]
struct FieldCollector {
    /// Open marked-content spans, innermost last. `None` for untagged spans.
    open: Vec<Option<FieldName>>,
    /// Text gathered for field spans that are still open.
    pending: BTreeMap<FieldName, String>,
    found: BTreeMap<FieldName, String>,
    saw_text: bool,
}

impl FieldCollector {
    fn apply(&mut self, operator: &str, operands: &[Object]) -> Result<(), ExtractionError> {
        match operator {
            "BMC" | "BDC" => {
                let field = match operands.first() {
                    Some(Object::Name(tag)) => field_for_tag(tag),
                    _ => None,
                };
                if let Some(field) = field {
                    self.pending.insert(field, String::new());
                }
                self.open.push(field);
            }
            "EMC" => {
                if let Some(Some(field)) = self.open.pop() {
                    let text = self.pending.remove(&field).unwrap_or_default();
                    if self.found.insert(field, text).is_some() {
                        return Err(ExtractionError::DuplicateField(field));
                    }
                }
            }
            "Tj" | "'" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(&decode_text(bytes));
                }
            }
            "\"" => {
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show(&decode_text(bytes));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let mut text = String::new();
                    for item in items {
                        match item {
                            Object::String(bytes, _) => text.push_str(&decode_text(bytes)),
                            Object::Integer(n) if (*n as f32) < TJ_SPACE_THRESHOLD => text.push(' '),
                            Object::Real(n) if (*n as f32) < TJ_SPACE_THRESHOLD => text.push(' '),
                            _ => {}
                        }
                    }
                    self.show(&text);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn show(&mut self, text: &str) {
        self.saw_text = true;
        let innermost = self.open.iter().rev().find_map(|f| *f);
        if let Some(field) = innermost {
            if let Some(buf) = self.pending.get_mut(&field) {
                buf.push_str(text);
            }
        }
    }

    fn finish(mut self) -> Result<CertificateFields, ExtractionError> {
        if !self.saw_text {
            return Err(ExtractionError::NoTextLayer);
        }

        let mut take = |name: FieldName| {
            self.found
                .remove(&name)
                .ok_or(ExtractionError::MissingField(name))
        };
        let fields = CertificateFields::new(
            take(FieldName::Organization)?,
            take(FieldName::Candidate)?,
            take(FieldName::Course)?,
            take(FieldName::Identifier)?,
        );

        debug!(candidate = %fields.candidate.trim(), "extracted certificate fields");
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{Composer, DocumentConfig};
    use crate::mark::OrganizationMark;
    use certledger_core::Fingerprint;
    use image::{ImageFormat, Rgba, RgbaImage};
    use lopdf::content::Operation;
    use lopdf::{dictionary, Stream, StringFormat};
    use std::io::Cursor;

    fn mark() -> OrganizationMark {
        let img = RgbaImage::from_pixel(2, 2, Rgba([200, 0, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        OrganizationMark::from_bytes(&out.into_inner()).unwrap()
    }

    fn composed(fields: &CertificateFields) -> Vec<u8> {
        let composer = Composer::new(DocumentConfig::default()).unwrap();
        composer
            .compose(fields, &Fingerprint::of(fields), &mark())
            .unwrap()
            .as_bytes()
            .to_vec()
    }

    /// A one-page PDF with the given content operations, or no pages at all.
    fn pdf_with(ops: Option<Vec<Operation>>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids = Vec::new();
        if let Some(ops) = ops {
            let content = Content { operations: ops };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            });
            kids.push(page_id.into());
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    fn text(s: &str) -> Operation {
        Operation::new("Tj", vec![Object::String(s.as_bytes().to_vec(), StringFormat::Literal)])
    }

    fn tagged(tag: &str, s: &str) -> Vec<Operation> {
        vec![
            Operation::new("BMC", vec![Object::Name(tag.as_bytes().to_vec())]),
            text(s),
            Operation::new("EMC", vec![]),
        ]
    }

    fn text_object(inner: Vec<Operation>) -> Vec<Operation> {
        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
        ];
        ops.extend(inner);
        ops.push(Operation::new("ET", vec![]));
        ops
    }

    #[test]
    fn test_roundtrip_composed_document() {
        let fields = CertificateFields::new("Acme University", "Jane Doe", "Distributed Systems", "U1234");
        let extracted = extract(&composed(&fields)).unwrap();
        assert_eq!(extracted, fields);
    }

    #[test]
    fn test_roundtrip_trims_and_keeps_internal_spacing() {
        let fields = CertificateFields::new(" Ünïversität ", "José  Ñúñez", "C++ & (Rust)\\", "ID-7");
        let extracted = extract(&composed(&fields)).unwrap();
        assert_eq!(extracted, fields.normalized());
        assert_eq!(Fingerprint::of(&extracted), Fingerprint::of(&fields));
    }

    #[test]
    fn test_not_a_pdf() {
        assert!(matches!(
            extract(b"definitely not a pdf"),
            Err(ExtractionError::Unreadable(_))
        ));
    }

    #[test]
    fn test_no_pages() {
        assert_eq!(extract(&pdf_with(None)), Err(ExtractionError::NoPages));
    }

    #[test]
    fn test_no_text_layer() {
        let ops = vec![
            Operation::new("re", vec![0.into(), 0.into(), 10.into(), 10.into()]),
            Operation::new("f", vec![]),
        ];
        assert_eq!(extract(&pdf_with(Some(ops))), Err(ExtractionError::NoTextLayer));
    }

    #[test]
    fn test_untagged_lines_are_not_read_positionally() {
        let ops = text_object(vec![
            text("Acme University"),
            text("Certificate of Completion"),
            text("This is to certify that"),
            text("Jane Doe"),
            text("with UID"),
            text("U1234"),
            text("has successfully completed the course:"),
            text("Distributed Systems"),
        ]);
        assert_eq!(
            extract(&pdf_with(Some(ops))),
            Err(ExtractionError::MissingField(FieldName::Organization))
        );
    }

    #[test]
    fn test_tagged_fields_in_any_order() {
        let mut inner = Vec::new();
        inner.extend(tagged("CertCourse", "Rust"));
        inner.push(text("unrelated wording"));
        inner.extend(tagged("CertIdentifier", "U9"));
        inner.extend(tagged("CertCandidate", "Ada"));
        inner.extend(tagged("CertOrganization", "Acme"));
        let fields = extract(&pdf_with(Some(text_object(inner)))).unwrap();
        assert_eq!(fields, CertificateFields::new("Acme", "Ada", "Rust", "U9"));
    }

    #[test]
    fn test_missing_field() {
        let mut inner = Vec::new();
        inner.extend(tagged("CertOrganization", "Acme"));
        inner.extend(tagged("CertCandidate", "Ada"));
        inner.extend(tagged("CertCourse", "Rust"));
        assert_eq!(
            extract(&pdf_with(Some(text_object(inner)))),
            Err(ExtractionError::MissingField(FieldName::Identifier))
        );
    }

    #[test]
    fn test_duplicate_field() {
        let mut inner = Vec::new();
        inner.extend(tagged("CertOrganization", "Acme"));
        inner.extend(tagged("CertCandidate", "Ada"));
        inner.extend(tagged("CertCandidate", "Eve"));
        assert_eq!(
            extract(&pdf_with(Some(text_object(inner)))),
            Err(ExtractionError::DuplicateField(FieldName::Candidate))
        );
    }

    #[test]
    fn test_tj_array_with_kerning() {
        let mut inner = Vec::new();
        inner.extend(tagged("CertOrganization", "Acme"));
        inner.push(Operation::new("BMC", vec![Object::Name(b"CertCandidate".to_vec())]));
        inner.push(Operation::new(
            "TJ",
            vec![Object::Array(vec![
                Object::string_literal("Ja"),
                Object::Integer(-20),
                Object::string_literal("ne"),
                Object::Integer(-400),
                Object::string_literal("Doe"),
            ])],
        ));
        inner.push(Operation::new("EMC", vec![]));
        inner.extend(tagged("CertCourse", "Rust"));
        inner.extend(tagged("CertIdentifier", "U1"));
        let fields = extract(&pdf_with(Some(text_object(inner)))).unwrap();
        assert_eq!(fields.candidate, "Jane Doe");
    }

    #[test]
    fn test_extract_file_size_gate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.pdf");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();
        assert_eq!(
            extract_file(&path, 1024),
            Err(ExtractionError::TooLarge { size: 2048, limit: 1024 })
        );
    }

    #[test]
    fn test_extract_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            extract_file(&dir.path().join("nope.pdf"), 1024),
            Err(ExtractionError::Io(_))
        ));
    }

    #[test]
    fn test_extract_file_roundtrip() {
        let fields = CertificateFields::new("Acme", "Ada", "Rust", "U1");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cert.pdf");
        std::fs::write(&path, composed(&fields)).unwrap();
        assert_eq!(extract_file(&path, 10 * 1024 * 1024).unwrap(), fields);
    }
}
