//! Scannable code generation.
//!
//! The payload is the fingerprint's 64-character lowercase hex form and
//! nothing else, so any scanner app reads back exactly what the verifier
//! accepts as an id.

use std::io::Cursor;

use certledger_core::Fingerprint;
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};

use crate::error::CodeError;

/// A generated QR symbol as a module grid.
#[derive(Clone, PartialEq, Eq)]
pub struct OpticalCode {
    payload: String,
    width: usize,
    modules: Vec<bool>,
}

impl OpticalCode {
    /// Encode a fingerprint at error-correction level M.
    pub fn for_fingerprint(fingerprint: &Fingerprint) -> Result<Self, CodeError> {
        Self::encode(&fingerprint.to_hex())
    }

    /// Encode an arbitrary payload at error-correction level M.
    pub fn encode(payload: &str) -> Result<Self, CodeError> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
            .map_err(|e| CodeError::Encode(e.to_string()))?;

        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == Color::Dark)
            .collect();

        Ok(Self {
            payload: payload.to_string(),
            width: code.width(),
            modules,
        })
    }

    /// The encoded payload.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Modules per side, excluding any quiet zone.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the module at (row, col) is dark. Out of range is light.
    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        row < self.width && col < self.width && self.modules[row * self.width + col]
    }

    /// Iterate dark modules as (row, col), row 0 at the top.
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.modules
            .iter()
            .enumerate()
            .filter(|(_, dark)| **dark)
            .map(move |(i, _)| (i / width, i % width))
    }

    /// Rasterize to a grayscale image.
    pub fn to_image(&self, module_px: u32, quiet_zone: u32) -> GrayImage {
        let module_px = module_px.max(1);
        let side = (self.width as u32 + 2 * quiet_zone) * module_px;
        let mut img = GrayImage::from_pixel(side, side, Luma([255]));

        for (row, col) in self.dark_modules() {
            let x0 = (col as u32 + quiet_zone) * module_px;
            let y0 = (row as u32 + quiet_zone) * module_px;
            for dy in 0..module_px {
                for dx in 0..module_px {
                    img.put_pixel(x0 + dx, y0 + dy, Luma([0]));
                }
            }
        }
        img
    }

    /// Rasterize and encode as PNG.
    pub fn to_png(&self, module_px: u32, quiet_zone: u32) -> Result<Vec<u8>, CodeError> {
        let mut out = Cursor::new(Vec::new());
        self.to_image(module_px, quiet_zone)
            .write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}

impl std::fmt::Debug for OpticalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpticalCode")
            .field("payload", &self.payload)
            .field("width", &self.width)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certledger_core::CertificateFields;

    fn fp() -> Fingerprint {
        Fingerprint::of(&CertificateFields::new("Acme University", "Jane Doe", "Distributed Systems", "U1234"))
    }

    #[test]
    fn test_payload_is_lowercase_hex() {
        let code = OpticalCode::for_fingerprint(&fp()).unwrap();
        assert_eq!(code.payload(), fp().to_hex());
        assert_eq!(code.payload().len(), 64);
    }

    #[test]
    fn test_symbol_is_square_with_finder_patterns() {
        let code = OpticalCode::for_fingerprint(&fp()).unwrap();
        let w = code.width();
        // QR widths are 17 + 4 * version
        assert_eq!((w - 17) % 4, 0);
        // Finder pattern corners are dark
        assert!(code.is_dark(0, 0));
        assert!(code.is_dark(0, w - 1));
        assert!(code.is_dark(w - 1, 0));
        // Separator next to the top-left finder is light
        assert!(!code.is_dark(7, 7));
        assert!(!code.is_dark(w, 0));
    }

    #[test]
    fn test_deterministic() {
        let a = OpticalCode::for_fingerprint(&fp()).unwrap();
        let b = OpticalCode::for_fingerprint(&fp()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_fingerprints_give_distinct_symbols() {
        let other = Fingerprint::of(&CertificateFields::new("Acme University", "Jane Doe", "Distributed Systems", "U1235"));
        let a = OpticalCode::for_fingerprint(&fp()).unwrap();
        let b = OpticalCode::for_fingerprint(&other).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_to_image_dimensions_and_pixels() {
        let code = OpticalCode::for_fingerprint(&fp()).unwrap();
        let img = code.to_image(4, 2);
        let side = (code.width() as u32 + 4) * 4;
        assert_eq!(img.dimensions(), (side, side));
        // Quiet zone is light, first module is dark
        assert_eq!(img.get_pixel(0, 0).0, [255]);
        assert_eq!(img.get_pixel(8, 8).0, [0]);
    }

    #[test]
    fn test_to_png_signature() {
        let png = OpticalCode::for_fingerprint(&fp()).unwrap().to_png(2, 2).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let huge = "x".repeat(8000);
        assert!(matches!(OpticalCode::encode(&huge), Err(CodeError::Encode(_))));
    }
}
