//! Document composition.
//!
//! Produces a single A4 page: organization mark top-left, the template lines
//! centered, and the optical code bottom-right inside a thin border. Every
//! field value is wrapped in a marked-content span tagged with its field
//! name, which is what the extractor keys on.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use certledger_core::{CertificateFields, FieldName, Fingerprint};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::code::OpticalCode;
use crate::error::{DocumentError, Result};
use crate::mark::OrganizationMark;
use crate::template::{
    centered_x, encode_text, fitted_size, marker_tag, text_width, Font, LineContent, TemplateLine,
    CODE_BORDER_GAP, CODE_QUIET_ZONE, CODE_TARGET_SIZE, DEFAULT_TITLE, LINES, MARGIN, MARK_BOX,
    PAGE_HEIGHT, PAGE_WIDTH, PRODUCER,
};

const MARK_RESOURCE: &str = "Im1";

/// Document settings, passed explicitly at construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Directory holding visual assets.
    pub assets_dir: PathBuf,
    /// Organization mark file name inside `assets_dir`.
    pub mark_file: String,
    /// Title line.
    pub title: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            mark_file: "logo.png".to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// A composed certificate document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificateDocument {
    fingerprint: Fingerprint,
    bytes: Bytes,
}

impl CertificateDocument {
    /// Fingerprint the document was composed for.
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// PDF bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Cheap clone of the PDF bytes.
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the PDF to a file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Composes certificate documents from a fixed template.
#[derive(Clone, Debug)]
pub struct Composer {
    config: DocumentConfig,
    title: Vec<u8>,
}

impl Composer {
    /// Create a composer. Fails if the title cannot be shown in the template font.
    pub fn new(config: DocumentConfig) -> Result<Self> {
        let title = encode_text(config.title.trim()).map_err(DocumentError::UnencodableTitle)?;
        Ok(Self { config, title })
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Load the configured organization mark.
    pub fn load_mark(&self) -> Result<OrganizationMark> {
        OrganizationMark::load(&self.config.assets_dir, &self.config.mark_file)
    }

    /// Compose a document for `fields`.
    ///
    /// `fingerprint` must be the fingerprint of `fields`; it becomes the
    /// optical code payload. Fields are laid out trimmed.
    pub fn compose(
        &self,
        fields: &CertificateFields,
        fingerprint: &Fingerprint,
        mark: &OrganizationMark,
    ) -> Result<CertificateDocument> {
        let expected = Fingerprint::of(fields);
        if expected != *fingerprint {
            return Err(DocumentError::FingerprintMismatch {
                supplied: *fingerprint,
                expected,
            });
        }

        let fields = fields.normalized();
        let mut encoded: Vec<(FieldName, Vec<u8>)> = Vec::with_capacity(4);
        for name in FieldName::ALL {
            let bytes = encode_text(fields.get(name))
                .map_err(|ch| DocumentError::UnencodableText { field: name, ch })?;
            encoded.push((name, bytes));
        }

        let code = OpticalCode::for_fingerprint(fingerprint)?;

        let mut ops = Vec::new();
        draw_mark(&mut ops, mark);
        for line in &LINES {
            let text = match line.content {
                LineContent::Title => self.title.as_slice(),
                LineContent::Fixed(s) => s.as_bytes(),
                LineContent::Field(name) => field_text(&encoded, name),
            };
            draw_line(&mut ops, line, text);
        }
        draw_code(&mut ops, &code);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(font_dict(Font::Regular));
        let bold_id = doc.add_object(font_dict(Font::Bold));
        let mark_id = doc.add_object(mark_stream(mark));

        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    Font::Regular.resource() => regular_id,
                    Font::Bold.resource() => bold_id,
                },
                "XObject" => dictionary! {
                    MARK_RESOURCE => mark_id,
                },
            },
        });

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => Object::Integer(1),
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(self.title.clone(), StringFormat::Literal),
            "Subject" => Object::string_literal(fingerprint.to_hex()),
            "Producer" => Object::string_literal(PRODUCER),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        doc.compress();
        let mut buf = Vec::new();
        doc.save_to(&mut buf)?;

        debug!(fingerprint = %fingerprint, bytes = buf.len(), "composed certificate");

        Ok(CertificateDocument {
            fingerprint: *fingerprint,
            bytes: Bytes::from(buf),
        })
    }

    /// Compose and write to `path`.
    pub fn compose_to(
        &self,
        fields: &CertificateFields,
        fingerprint: &Fingerprint,
        mark: &OrganizationMark,
        path: &Path,
    ) -> Result<CertificateDocument> {
        let document = self.compose(fields, fingerprint, mark)?;
        document.write_to(path)?;
        Ok(document)
    }
}

fn field_text(encoded: &[(FieldName, Vec<u8>)], name: FieldName) -> &[u8] {
    encoded
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, b)| b.as_slice())
        .unwrap_or_default()
}

fn op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

fn name(s: &str) -> Object {
    Object::Name(s.as_bytes().to_vec())
}

fn font_dict(font: Font) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn mark_stream(mark: &OrganizationMark) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => mark.width() as i64,
            "Height" => mark.height() as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => Object::Integer(8),
        },
        mark.rgb().to_vec(),
    )
}

fn draw_mark(ops: &mut Vec<Operation>, mark: &OrganizationMark) {
    let (w, h) = mark.fitted(MARK_BOX);
    let x = MARGIN;
    let y = PAGE_HEIGHT - MARGIN - h;
    ops.push(op("q", vec![]));
    ops.push(op(
        "cm",
        vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
    ));
    ops.push(op("Do", vec![name(MARK_RESOURCE)]));
    ops.push(op("Q", vec![]));
}

fn draw_line(ops: &mut Vec<Operation>, line: &TemplateLine, text: &[u8]) {
    let size = fitted_size(text, line.size);
    let x = centered_x(text_width(text, size));
    let [r, g, b] = line.ink.rgb();

    ops.push(op("BT", vec![]));
    ops.push(op("Tf", vec![name(line.font.resource()), size.into()]));
    ops.push(op("rg", vec![r.into(), g.into(), b.into()]));
    ops.push(op("Td", vec![x.into(), line.baseline.into()]));

    let tag = match line.content {
        LineContent::Field(field) => Some(marker_tag(field)),
        _ => None,
    };
    if let Some(tag) = tag {
        ops.push(op("BMC", vec![name(tag)]));
    }
    ops.push(op(
        "Tj",
        vec![Object::String(text.to_vec(), StringFormat::Literal)],
    ));
    if tag.is_some() {
        ops.push(op("EMC", vec![]));
    }
    ops.push(op("ET", vec![]));
}

/// Module edge in points, and total symbol edge including quiet zone.
fn code_geometry(code: &OpticalCode) -> (i64, i64) {
    let total = (code.width() + 2 * CODE_QUIET_ZONE) as i64;
    let module = ((CODE_TARGET_SIZE + total / 2) / total).max(1);
    (module, total * module)
}

fn draw_code(ops: &mut Vec<Operation>, code: &OpticalCode) {
    let (module, size) = code_geometry(code);
    let total = (code.width() + 2 * CODE_QUIET_ZONE) as i64;
    let quiet = CODE_QUIET_ZONE as i64;
    let x0 = PAGE_WIDTH - MARGIN - size;
    let y0 = MARGIN;

    ops.push(op("q", vec![]));
    ops.push(op("rg", vec![0.into(), 0.into(), 0.into()]));
    for (row, col) in code.dark_modules() {
        let x = x0 + (col as i64 + quiet) * module;
        // PDF y grows upward; row 0 is the top of the symbol.
        let y = y0 + (total - 1 - (row as i64 + quiet)) * module;
        ops.push(op(
            "re",
            vec![x.into(), y.into(), module.into(), module.into()],
        ));
    }
    ops.push(op("f", vec![]));

    let gap = CODE_BORDER_GAP;
    ops.push(op("RG", vec![0.into(), 0.into(), 0.into()]));
    ops.push(op("w", vec![1.into()]));
    ops.push(op(
        "re",
        vec![
            (x0 - gap).into(),
            (y0 - gap).into(),
            (size + 2 * gap).into(),
            (size + 2 * gap).into(),
        ],
    ));
    ops.push(op("S", vec![]));
    ops.push(op("Q", vec![]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn mark() -> OrganizationMark {
        let img = RgbaImage::from_pixel(8, 4, Rgba([0, 64, 128, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        OrganizationMark::from_bytes(&out.into_inner()).unwrap()
    }

    fn acme() -> CertificateFields {
        CertificateFields::new("Acme University", "Jane Doe", "Distributed Systems", "U1234")
    }

    #[test]
    fn test_compose_produces_pdf() {
        let composer = Composer::new(DocumentConfig::default()).unwrap();
        let fields = acme();
        let doc = composer.compose(&fields, &Fingerprint::of(&fields), &mark()).unwrap();
        assert!(doc.as_bytes().starts_with(b"%PDF-1.5"));
        assert_eq!(doc.fingerprint(), &Fingerprint::of(&fields));

        let loaded = Document::load_mem(doc.as_bytes()).unwrap();
        assert_eq!(loaded.get_pages().len(), 1);
    }

    #[test]
    fn test_compose_rejects_mismatched_fingerprint() {
        let composer = Composer::new(DocumentConfig::default()).unwrap();
        let other = CertificateFields::new("Acme University", "John Doe", "Distributed Systems", "U1234");
        let err = composer
            .compose(&acme(), &Fingerprint::of(&other), &mark())
            .unwrap_err();
        assert!(matches!(err, DocumentError::FingerprintMismatch { .. }));
    }

    #[test]
    fn test_compose_rejects_unencodable_field() {
        let composer = Composer::new(DocumentConfig::default()).unwrap();
        let fields = CertificateFields::new("Acme", "Łukasz", "Rust", "U1");
        let err = composer
            .compose(&fields, &Fingerprint::of(&fields), &mark())
            .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::UnencodableText { field: FieldName::Candidate, ch: 'Ł' }
        ));
    }

    #[test]
    fn test_unencodable_title_rejected_at_construction() {
        let config = DocumentConfig {
            title: "Сертификат".to_string(),
            ..DocumentConfig::default()
        };
        assert!(matches!(
            Composer::new(config),
            Err(DocumentError::UnencodableTitle('С'))
        ));
    }

    #[test]
    fn test_load_mark_missing() {
        let dir = tempfile::tempdir().unwrap();
        let composer = Composer::new(DocumentConfig {
            assets_dir: dir.path().to_path_buf(),
            ..DocumentConfig::default()
        })
        .unwrap();
        assert!(matches!(composer.load_mark(), Err(DocumentError::AssetMissing(_))));
    }

    #[test]
    fn test_compose_to_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cert.pdf");
        let composer = Composer::new(DocumentConfig::default()).unwrap();
        let fields = acme();
        let doc = composer
            .compose_to(&fields, &Fingerprint::of(&fields), &mark(), &path)
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), doc.as_bytes());
    }

    #[test]
    fn test_code_fits_its_corner() {
        let fields = acme();
        let code = OpticalCode::for_fingerprint(&Fingerprint::of(&fields)).unwrap();
        let (module, size) = code_geometry(&code);
        assert!(module >= 2);
        // Right half of the page, below the last text line.
        assert!(PAGE_WIDTH - MARGIN - size - CODE_BORDER_GAP > PAGE_WIDTH / 2);
        assert!(MARGIN + size + CODE_BORDER_GAP < LINES[7].baseline);
    }

    #[test]
    fn test_long_field_is_shrunk_to_fit() {
        let composer = Composer::new(DocumentConfig::default()).unwrap();
        let candidate = "W".repeat(256);
        let fields = CertificateFields::new("Acme University", candidate.as_str(), "Distributed Systems", "U1234");
        let doc = composer.compose(&fields, &Fingerprint::of(&fields), &mark()).unwrap();

        let loaded = Document::load_mem(doc.as_bytes()).unwrap();
        let page = *loaded.get_pages().values().next().unwrap();
        let content = Content::decode(&loaded.get_page_content(page).unwrap()).unwrap();

        // (font size, x) of the text object holding each tagged span
        let mut sizes = Vec::new();
        let (mut size, mut x) = (0, 0);
        for op in &content.operations {
            match op.operator.as_str() {
                "Tf" => size = op.operands[1].as_i64().unwrap(),
                "Td" => x = op.operands[0].as_i64().unwrap(),
                "BMC" => sizes.push((op.operands[0].as_name().unwrap().to_vec(), size, x)),
                _ => {}
            }
        }

        for (tag, size, x) in sizes {
            if tag == b"CertCandidate" {
                assert!(size < 14);
                assert!(x >= MARGIN);
                assert!(x + text_width(candidate.as_bytes(), size) <= PAGE_WIDTH - MARGIN);
            } else {
                assert!(size >= 14, "{}", String::from_utf8_lossy(&tag));
            }
        }

        assert_eq!(crate::extract(doc.as_bytes()).unwrap(), fields);
    }
}
