// qrsheet-pdf: PDF output

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use ::image::RgbImage;
use printpdf::*;

use crate::error::AppError;
use crate::layout::{LayoutConfig, Pagination, Placement};

/// Caption font size in points
const CAPTION_FONT_SIZE: f32 = 5.0;

/// Caption baseline relative to the glyph's bottom edge, in mm (negative is inside)
const CAPTION_OFFSET_MM: f32 = -0.5;

/// Average Helvetica advance width as a fraction of the font size
const HELVETICA_AVG_WIDTH_EM: f32 = 0.5;

const MM_PER_PT: f32 = 25.4 / 72.0;

/// A PDF of QR glyphs with captions, one page per grid page.
///
/// Positions handed to [`QrSheetDocument::place`] are measured from the top-left
/// corner; they are flipped to PDF's bottom-left origin here.
pub struct QrSheetDocument {
    doc: PdfDocumentReference,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    font: IndirectFontRef,
    page_width: f32,
    page_height: f32,
}

impl QrSheetDocument {
    pub fn new(title: &str, page_width: f32, page_height: f32) -> Result<Self, AppError> {
        let (doc, page1, layer1) =
            PdfDocument::new(title, Mm(page_width), Mm(page_height), "Layer 1");

        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::Pdf(e.to_string()))?;

        Ok(Self {
            doc,
            pages: vec![(page1, layer1)],
            font,
            page_width,
            page_height,
        })
    }

    pub fn page_height(&self) -> f32 {
        self.page_height
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Draw one glyph and its caption, adding pages as needed.
    pub fn place(&mut self, placement: &Placement, cfg: &LayoutConfig) -> Result<(), AppError> {
        let layer = self.layer(placement.page);
        let size = cfg.glyph_size;

        // Glyph bottom edge in PDF coordinates
        let bottom = self.page_height - placement.y - size;
        embed_glyph(&layer, &placement.glyph, placement.x, bottom, size)?;

        let label = &placement.entry.label;
        if !label.is_empty() {
            let center_x = placement.x + size / 2.0;
            let text_x = center_x - caption_width(label) / 2.0;
            let baseline = bottom - CAPTION_OFFSET_MM;
            layer.use_text(label, CAPTION_FONT_SIZE, Mm(text_x), Mm(baseline), &self.font);
        }

        Ok(())
    }

    pub fn save(self, path: impl AsRef<Path>) -> Result<(), AppError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.doc
            .save(&mut writer)
            .map_err(|e| AppError::Pdf(e.to_string()))
    }

    pub fn to_bytes(self) -> Result<Vec<u8>, AppError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| AppError::Pdf(e.to_string()))
    }

    fn layer(&mut self, page: usize) -> PdfLayerReference {
        while self.pages.len() <= page {
            let added = self.doc.add_page(
                Mm(self.page_width),
                Mm(self.page_height),
                "Layer 1",
            );
            self.pages.push(added);
        }
        let (page_index, layer_index) = self.pages[page];
        self.doc.get_page(page_index).get_layer(layer_index)
    }
}

/// Lay out every placement of a pass into a new document.
pub fn render_document(
    pagination: &Pagination,
    cfg: &LayoutConfig,
    page_width: f32,
) -> Result<QrSheetDocument, AppError> {
    let mut doc = QrSheetDocument::new("QR Codes", page_width, cfg.page_height)?;
    for placement in &pagination.placements {
        doc.place(placement, cfg)?;
    }
    Ok(doc)
}

/// Render a pass and save it to `path`. Returns the number of pages written.
pub fn write_pdf(
    path: impl AsRef<Path>,
    pagination: &Pagination,
    cfg: &LayoutConfig,
    page_width: f32,
) -> Result<usize, AppError> {
    let doc = render_document(pagination, cfg, page_width)?;
    let pages = doc.page_count();
    doc.save(path)?;
    Ok(pages)
}

fn embed_glyph(
    layer: &PdfLayerReference,
    glyph: &RgbImage,
    x: f32,
    y: f32,
    size_mm: f32,
) -> Result<(), AppError> {
    let (width, height) = glyph.dimensions();
    if width == 0 || height == 0 {
        return Err(AppError::Pdf("QR code image is empty".to_string()));
    }

    let image = Image::from(ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: glyph.as_raw().clone(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });

    // DPI = pixels / (mm / 25.4)
    let dpi = (width as f32) / (size_mm / 25.4);

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(y)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );

    Ok(())
}

/// Estimated rendered width of a caption in mm.
fn caption_width(text: &str) -> f32 {
    text.chars().count() as f32 * CAPTION_FONT_SIZE * HELVETICA_AVG_WIDTH_EM * MM_PER_PT
}
