//! Hand-built and doctored PDFs for verification tests.

use certledger_core::FieldName;
use certledger_document::template::marker_tag;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

/// A valid one-page PDF that draws a rectangle and no text.
pub fn pdf_without_text() -> Vec<u8> {
    let ops = vec![
        Operation::new("re", vec![50.into(), 50.into(), 100.into(), 100.into()]),
        Operation::new("f", vec![]),
    ];
    single_page(ops)
}

/// A one-page PDF showing `lines` as plain, untagged text.
pub fn pdf_with_plain_text(lines: &[&str]) -> Vec<u8> {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
    ];
    for (i, line) in lines.iter().enumerate() {
        let y = 700 - 20 * i as i64;
        ops.push(Operation::new("Td", vec![72.into(), y.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(line.as_bytes().to_vec(), StringFormat::Literal)],
        ));
    }
    ops.push(Operation::new("ET", vec![]));
    single_page(ops)
}

fn single_page(ops: Vec<Operation>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content = Content { operations: ops };
    let encoded = content.encode().expect("encode content");
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("save pdf");
    buf
}

/// Rewrite the text inside `field`'s tagged span, leaving everything else
/// (including the embedded code) untouched. Mimics someone editing a
/// certificate in a PDF editor.
pub fn tamper_field(pdf: &[u8], field: FieldName, value: &str) -> Vec<u8> {
    rewrite_pages(pdf, |ops| {
        let tag = marker_tag(field).as_bytes();
        let mut inside = false;
        for op in ops.iter_mut() {
            match op.operator.as_str() {
                "BMC" => {
                    inside = matches!(op.operands.first(), Some(Object::Name(n)) if n == tag);
                }
                "EMC" => inside = false,
                "Tj" if inside => {
                    op.operands =
                        vec![Object::String(value.as_bytes().to_vec(), StringFormat::Literal)];
                }
                _ => {}
            }
        }
    })
}

/// Drop every marked-content operator, leaving the field text in place but
/// untagged.
pub fn strip_field_tags(pdf: &[u8]) -> Vec<u8> {
    rewrite_pages(pdf, |ops| {
        ops.retain(|op| !matches!(op.operator.as_str(), "BMC" | "BDC" | "EMC"));
    })
}

fn rewrite_pages(pdf: &[u8], edit: impl Fn(&mut Vec<Operation>)) -> Vec<u8> {
    let mut doc = Document::load_mem(pdf).expect("load pdf");
    let pages: Vec<_> = doc.get_pages().into_values().collect();
    for page_id in pages {
        let raw = doc.get_page_content(page_id).expect("page content");
        let mut content = Content::decode(&raw).expect("decode content");
        edit(&mut content.operations);
        let encoded = content.encode().expect("encode content");
        doc.change_page_content(page_id, encoded)
            .expect("replace page content");
    }
    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("save pdf");
    buf
}
