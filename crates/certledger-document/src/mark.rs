//! The issuing organization's mark (logo).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::error::{DocumentError, Result};

/// A decoded organization mark, flattened to 8-bit RGB on white.
#[derive(Clone, PartialEq, Eq)]
pub struct OrganizationMark {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

impl OrganizationMark {
    /// Load a PNG or JPEG mark from the assets directory.
    ///
    /// A missing file is [`DocumentError::AssetMissing`]; nothing is composed
    /// without it.
    pub fn load(assets_dir: &Path, file: &str) -> Result<Self> {
        let path = assets_dir.join(file);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DocumentError::AssetMissing(path))
            }
            Err(e) => return Err(DocumentError::Io(e)),
        };
        Self::decode(&bytes, path)
    }

    /// Decode a mark from in-memory image bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::decode(bytes, PathBuf::from("<memory>"))
    }

    fn decode(bytes: &[u8], path: PathBuf) -> Result<Self> {
        let img = image::load_from_memory(bytes).map_err(|e| DocumentError::AssetInvalid {
            path,
            reason: e.to_string(),
        })?;
        Ok(Self::from_rgba(&img.to_rgba8()))
    }

    fn from_rgba(img: &RgbaImage) -> Self {
        let mut rgb = Vec::with_capacity(img.width() as usize * img.height() as usize * 3);
        for px in img.pixels() {
            let [r, g, b, a] = px.0;
            let a = a as u16;
            for c in [r, g, b] {
                rgb.push(((c as u16 * a + 255 * (255 - a)) / 255) as u8);
            }
        }
        Self {
            width: img.width(),
            height: img.height(),
            rgb,
        }
    }

    /// Pixel width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Pixel height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB samples, row-major, top row first.
    pub fn rgb(&self) -> &[u8] {
        &self.rgb
    }

    /// Size in points when scaled to fit a square box, preserving aspect.
    pub fn fitted(&self, box_size: i64) -> (i64, i64) {
        let (w, h) = (self.width.max(1) as i64, self.height.max(1) as i64);
        if w >= h {
            (box_size, (box_size * h / w).max(1))
        } else {
            ((box_size * w / h).max(1), box_size)
        }
    }
}

impl std::fmt::Debug for OrganizationMark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrganizationMark({}x{})", self.width, self.height)
    }
}
