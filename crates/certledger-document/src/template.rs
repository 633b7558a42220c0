//! The certificate template: page geometry, line order, field markers.
//!
//! This module is the compatibility contract between the composer and the
//! extractor. Line order and marker tags must not change without a new
//! template family.

use certledger_core::FieldName;

/// A4 width in points.
pub const PAGE_WIDTH: i64 = 595;
/// A4 height in points.
pub const PAGE_HEIGHT: i64 = 842;
/// Page margin in points.
pub const MARGIN: i64 = 50;

/// The organization mark is scaled to fit this square box, top-left.
pub const MARK_BOX: i64 = 100;

/// Target edge length of the optical code, bottom-right.
pub const CODE_TARGET_SIZE: i64 = 108;
/// Light modules around the code symbol.
pub const CODE_QUIET_ZONE: usize = 2;
/// Gap between the code and its border.
pub const CODE_BORDER_GAP: i64 = 5;

/// Default title line.
pub const DEFAULT_TITLE: &str = "Certificate of Completion";

/// Document producer recorded in the info dictionary.
pub const PRODUCER: &str = "certledger";

/// Marked-content tag wrapping a field value.
pub const fn marker_tag(field: FieldName) -> &'static str {
    match field {
        FieldName::Organization => "CertOrganization",
        FieldName::Candidate => "CertCandidate",
        FieldName::Course => "CertCourse",
        FieldName::Identifier => "CertIdentifier",
    }
}

/// Inverse of [`marker_tag`].
pub fn field_for_tag(tag: &[u8]) -> Option<FieldName> {
    FieldName::ALL
        .into_iter()
        .find(|field| marker_tag(*field).as_bytes() == tag)
}

/// Standard fonts used by the template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Resource name in the page's font dictionary.
    pub const fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    /// PDF base font name.
    pub const fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }
}

/// Fill colour, as 0/1 RGB components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ink {
    Black,
    Red,
    Blue,
}

impl Ink {
    pub const fn rgb(self) -> [i64; 3] {
        match self {
            Ink::Black => [0, 0, 0],
            Ink::Red => [1, 0, 0],
            Ink::Blue => [0, 0, 1],
        }
    }
}

/// What a template line shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineContent {
    /// The configurable title.
    Title,
    /// Fixed text.
    Fixed(&'static str),
    /// A certificate field value.
    Field(FieldName),
}

/// One line of the template.
#[derive(Clone, Copy, Debug)]
pub struct TemplateLine {
    pub content: LineContent,
    pub font: Font,
    pub size: i64,
    pub ink: Ink,
    /// Baseline, in points from the bottom of the page.
    pub baseline: i64,
}

const fn line(content: LineContent, font: Font, size: i64, ink: Ink, baseline: i64) -> TemplateLine {
    TemplateLine {
        content,
        font,
        size,
        ink,
        baseline,
    }
}

/// Lines top to bottom. Organization first, course last.
pub const LINES: [TemplateLine; 8] = [
    line(LineContent::Field(FieldName::Organization), Font::Bold, 15, Ink::Black, 660),
    line(LineContent::Title, Font::Bold, 25, Ink::Black, 600),
    line(LineContent::Fixed("This is to certify that"), Font::Regular, 14, Ink::Black, 540),
    line(LineContent::Field(FieldName::Candidate), Font::Regular, 14, Ink::Red, 514),
    line(LineContent::Fixed("with UID"), Font::Regular, 14, Ink::Black, 488),
    line(LineContent::Field(FieldName::Identifier), Font::Regular, 14, Ink::Red, 462),
    line(LineContent::Fixed("has successfully completed the course:"), Font::Regular, 14, Ink::Black, 424),
    line(LineContent::Field(FieldName::Course), Font::Regular, 14, Ink::Blue, 398),
];

/// Helvetica advance widths for 0x20..=0x7E, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
];

/// Width available to a line between the page margins.
pub const LINE_WIDTH: i64 = PAGE_WIDTH - 2 * MARGIN;

fn text_units(encoded: &[u8]) -> i64 {
    encoded
        .iter()
        .map(|&b| match b {
            0x20..=0x7e => HELVETICA_WIDTHS[(b - 0x20) as usize] as i64,
            _ => 556,
        })
        .sum()
}

/// Approximate rendered width of encoded text, in points.
///
/// Uses regular metrics for both weights; only used for layout.
pub fn text_width(encoded: &[u8], size: i64) -> i64 {
    text_units(encoded) * size / 1000
}

/// The largest font size, at most `size`, at which `encoded` fits within
/// [`LINE_WIDTH`]. Never below 1pt.
pub fn fitted_size(encoded: &[u8], size: i64) -> i64 {
    let units = text_units(encoded);
    if units * size / 1000 <= LINE_WIDTH {
        return size;
    }
    (LINE_WIDTH * 1000 / units).clamp(1, size)
}

/// X coordinate that centers text of the given width on the page.
pub fn centered_x(width: i64) -> i64 {
    ((PAGE_WIDTH - width) / 2).max(MARGIN / 2)
}

/// Encode text for the template's WinAnsi fonts.
///
/// Accepts printable ASCII and Latin-1 (U+00A0..=U+00FF), where WinAnsi and
/// Latin-1 agree. Returns the first character outside that range.
pub fn encode_text(s: &str) -> std::result::Result<Vec<u8>, char> {
    s.chars()
        .map(|c| match c as u32 {
            0x20..=0x7e | 0xa0..=0xff => Ok(c as u32 as u8),
            _ => Err(c),
        })
        .collect()
}

/// Decode text shown with the template's fonts.
pub fn decode_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
