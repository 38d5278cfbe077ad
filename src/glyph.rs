// qrsheet-pdf: QR glyph rasterization

use ::image::{Rgb, RgbImage};
use qrcode::QrCode;

use crate::error::AppError;

/// Light module colour used for glyphs embedded in the PDF.
const PRINT_LIGHT: Rgb<u8> = Rgb([0xEB, 0xEB, 0xEB]);
const SCREEN_LIGHT: Rgb<u8> = Rgb([0xFF, 0xFF, 0xFF]);
const DARK: Rgb<u8> = Rgb([0x00, 0x00, 0x00]);

/// Turns a payload into a square raster image of at least `size` pixels per edge.
///
/// Called once per entry, in order. A failure affects only that entry.
pub trait GlyphRenderer {
    fn render(&self, payload: &str, size: u32) -> Result<RgbImage, AppError>;
}

/// [`GlyphRenderer`] backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrGlyphRenderer {
    dark: Rgb<u8>,
    light: Rgb<u8>,
}

impl QrGlyphRenderer {
    /// Black on light grey, as drawn on the exported sheet.
    pub fn for_print() -> Self {
        Self {
            dark: DARK,
            light: PRINT_LIGHT,
        }
    }

    /// Black on white, for preview images.
    pub fn for_screen() -> Self {
        Self {
            dark: DARK,
            light: SCREEN_LIGHT,
        }
    }
}

impl Default for QrGlyphRenderer {
    fn default() -> Self {
        Self::for_print()
    }
}

impl GlyphRenderer for QrGlyphRenderer {
    fn render(&self, payload: &str, size: u32) -> Result<RgbImage, AppError> {
        let code = QrCode::new(payload.as_bytes())
            .map_err(|e| AppError::Glyph(e.to_string()))?;

        let image = code
            .render::<Rgb<u8>>()
            .dark_color(self.dark)
            .light_color(self.light)
            .min_dimensions(size, size)
            .build();
        Ok(image)
    }
}
