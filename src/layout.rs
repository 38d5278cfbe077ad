// qrsheet-pdf: grid pagination of QR glyphs

use ::image::RgbImage;
use serde::Serialize;

use crate::error::AppError;
use crate::extract::Entry;
use crate::glyph::GlyphRenderer;

// ============================================================================
// Defaults
// ============================================================================

/// QR code edge in mm
pub const GLYPH_SIZE_MM: f32 = 30.0;

/// Gap between glyphs, horizontally and between rows
pub const MARGIN_MM: f32 = 6.0;

pub const COLUMNS_PER_ROW: u32 = 5;

/// Top-left of the first glyph on each page
pub const START_X_MM: f32 = 18.0;
pub const START_Y_MM: f32 = 20.0;

/// A4 portrait
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// Raster edge requested for each glyph
pub const GLYPH_PIXELS: u32 = 256;

// ============================================================================
// Data Structures
// ============================================================================

/// Grid geometry. All lengths in mm, measured from the page's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutConfig {
    pub glyph_size: f32,
    pub margin: f32,
    pub columns_per_row: u32,
    pub start_x: f32,
    pub start_y: f32,
    pub page_height: f32,
    pub glyph_pixels: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            glyph_size: GLYPH_SIZE_MM,
            margin: MARGIN_MM,
            columns_per_row: COLUMNS_PER_ROW,
            start_x: START_X_MM,
            start_y: START_Y_MM,
            page_height: PAGE_HEIGHT_MM,
            glyph_pixels: GLYPH_PIXELS,
        }
    }
}

impl LayoutConfig {
    /// Distance the cursor moves per glyph, in either direction.
    pub fn step(&self) -> f32 {
        self.glyph_size + self.margin
    }

    /// Lowest `y` at which a glyph row may still start on the current page.
    fn last_row_y(&self) -> f32 {
        self.page_height - self.margin - self.glyph_size
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let lengths = [
            ("glyph size", self.glyph_size),
            ("margin", self.margin),
            ("start x", self.start_x),
            ("start y", self.start_y),
            ("page height", self.page_height),
        ];
        if let Some((name, _)) = lengths.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AppError::Layout(format!("{} must be a finite number", name)));
        }
        if self.glyph_size <= 0.0 {
            return Err(AppError::Layout(format!(
                "glyph size must be positive, got {}",
                self.glyph_size
            )));
        }
        if self.margin < 0.0 {
            return Err(AppError::Layout(format!(
                "margin must not be negative, got {}",
                self.margin
            )));
        }
        if self.columns_per_row == 0 {
            return Err(AppError::Layout("columns per row must be at least 1".to_string()));
        }
        if self.glyph_pixels == 0 {
            return Err(AppError::Layout("glyph pixels must be at least 1".to_string()));
        }
        if self.start_y + self.glyph_size > self.page_height {
            return Err(AppError::Layout(format!(
                "page height {} cannot hold a {} glyph starting at y = {}",
                self.page_height, self.glyph_size, self.start_y
            )));
        }
        Ok(())
    }
}

/// An entry assigned to a page and a top-left position on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub entry: Entry,
    pub page: usize,
    pub x: f32,
    pub y: f32,
    #[serde(skip)]
    pub glyph: RgbImage,
}

/// An entry whose glyph could not be produced. It takes no grid slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlyphFailure {
    /// Position of the entry in the paginated sequence
    pub index: usize,
    pub entry: Entry,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pagination {
    pub placements: Vec<Placement>,
    pub failures: Vec<GlyphFailure>,
}

impl Pagination {
    /// Number of pages the placements occupy.
    pub fn page_count(&self) -> usize {
        self.placements.last().map_or(0, |p| p.page + 1)
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Assign every entry a page and grid position, rendering its glyph on the way.
///
/// Entries are visited strictly in order and the renderer is called once per entry,
/// never concurrently. An entry whose glyph fails is recorded in
/// [`Pagination::failures`] and does not move the cursor, so the next entry takes
/// its slot.
pub fn paginate<R>(entries: &[Entry], cfg: &LayoutConfig, renderer: &R) -> Pagination
where
    R: GlyphRenderer + ?Sized,
{
    let mut result = Pagination::default();
    let mut x = cfg.start_x;
    let mut y = cfg.start_y;
    let mut column_count = 0u32;
    let mut page = 0usize;
    let last_index = entries.len().saturating_sub(1);

    for (index, entry) in entries.iter().enumerate() {
        let glyph = match renderer.render(&entry.value, cfg.glyph_pixels) {
            Ok(glyph) => glyph,
            Err(e) => {
                log::warn!("Skipping QR code for label \"{}\": {}", entry.label, e);
                result.failures.push(GlyphFailure {
                    index,
                    entry: entry.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        log::debug!("Placing \"{}\" on page {} at ({}, {})", entry.value, page, x, y);
        result.placements.push(Placement {
            entry: entry.clone(),
            page,
            x,
            y,
            glyph,
        });

        x += cfg.step();
        column_count += 1;

        // The last entry always closes its row
        if column_count >= cfg.columns_per_row || index == last_index {
            x = cfg.start_x;
            y += cfg.step();
            column_count = 0;
        }

        if y > cfg.last_row_y() {
            page += 1;
            log::debug!("Page break after entry {}, continuing on page {}", index, page);
            x = cfg.start_x;
            y = cfg.start_y;
            column_count = 0;
        }
    }

    log::info!(
        "Placed {} of {} QR codes on {} page(s)",
        result.placements.len(),
        entries.len(),
        result.page_count()
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    /// Returns a 1x1 image, or fails for payloads listed in `failing`.
    struct StubRenderer {
        failing: Vec<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl StubRenderer {
        fn new() -> Self {
            Self::failing_on(&[])
        }

        fn failing_on(failing: &[&'static str]) -> Self {
            Self {
                failing: failing.to_vec(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl GlyphRenderer for StubRenderer {
        fn render(&self, payload: &str, _size: u32) -> Result<RgbImage, AppError> {
            self.calls.borrow_mut().push(payload.to_string());
            if self.failing.iter().any(|f| *f == payload) {
                return Err(AppError::Glyph(format!("cannot encode {}", payload)));
            }
            Ok(RgbImage::new(1, 1))
        }
    }

    fn entries(n: usize) -> Vec<Entry> {
        (1..=n)
            .map(|i| Entry {
                label: format!("L{}", i),
                value: format!("V{}", i),
            })
            .collect()
    }

    fn positions(p: &Pagination) -> Vec<(usize, f32, f32)> {
        p.placements.iter().map(|p| (p.page, p.x, p.y)).collect()
    }

    #[test]
    fn empty_input_yields_nothing() {
        let renderer = StubRenderer::new();
        let result = paginate(&[], &LayoutConfig::default(), &renderer);
        assert!(result.placements.is_empty());
        assert!(result.failures.is_empty());
        assert_eq!(result.page_count(), 0);
        assert!(renderer.calls.borrow().is_empty());
    }

    #[test]
    fn full_row_of_five() {
        let cfg = LayoutConfig::default();
        let result = paginate(&entries(5), &cfg, &StubRenderer::new());

        let xs: Vec<f32> = result.placements.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![18.0, 54.0, 90.0, 126.0, 162.0]);
        assert!(result.placements.iter().all(|p| p.page == 0 && p.y == 20.0));
    }

    #[test]
    fn wraps_to_next_row_after_columns_per_row() {
        let cfg = LayoutConfig::default();
        let result = paginate(&entries(7), &cfg, &StubRenderer::new());

        assert_eq!(result.placements[5].x, 18.0);
        assert_eq!(result.placements[5].y, 56.0);
        assert_eq!(result.placements[6].x, 54.0);
        assert_eq!(result.placements[6].y, 56.0);
    }

    #[test]
    fn failed_glyph_gives_up_its_slot() {
        let cfg = LayoutConfig::default();
        let renderer = StubRenderer::failing_on(&["V3"]);
        let result = paginate(&entries(5), &cfg, &renderer);

        let labels: Vec<&str> = result.placements.iter().map(|p| p.entry.label.as_str()).collect();
        assert_eq!(labels, vec!["L1", "L2", "L4", "L5"]);
        let xs: Vec<f32> = result.placements.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![18.0, 54.0, 90.0, 126.0]);

        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].index, 2);
        assert_eq!(result.failures[0].entry.label, "L3");
        assert_eq!(renderer.calls.borrow().len(), 5);
    }

    #[test]
    fn renderer_called_in_input_order() {
        let renderer = StubRenderer::new();
        paginate(&entries(4), &LayoutConfig::default(), &renderer);
        assert_eq!(*renderer.calls.borrow(), vec!["V1", "V2", "V3", "V4"]);
    }

    #[test]
    fn breaks_page_when_next_row_would_not_fit() {
        // Rows start at 20, 56, 92, ..., 236; the next row (272) exceeds 297 - 6 - 30
        let cfg = LayoutConfig::default();
        let result = paginate(&entries(37), &cfg, &StubRenderer::new());

        let first_page: Vec<_> = result.placements.iter().filter(|p| p.page == 0).collect();
        assert_eq!(first_page.len(), 35);
        assert_eq!(first_page.last().unwrap().y, 236.0);

        assert_eq!(result.placements[35].page, 1);
        assert_eq!((result.placements[35].x, result.placements[35].y), (18.0, 20.0));
        assert_eq!(result.placements[36].x, 54.0);
        assert_eq!(result.page_count(), 2);
    }

    #[test]
    fn trailing_wrap_on_last_entry_does_not_leave_empty_page() {
        // Exactly one full page: the final wrap triggers a break with nothing after it
        let cfg = LayoutConfig::default();
        let result = paginate(&entries(35), &cfg, &StubRenderer::new());
        assert_eq!(result.placements.len(), 35);
        assert_eq!(result.page_count(), 1);
    }

    #[test]
    fn single_column_layout() {
        let cfg = LayoutConfig {
            columns_per_row: 1,
            ..LayoutConfig::default()
        };
        let result = paginate(&entries(3), &cfg, &StubRenderer::new());
        assert_eq!(
            positions(&result),
            vec![(0, 18.0, 20.0), (0, 18.0, 56.0), (0, 18.0, 92.0)]
        );
    }

    #[test]
    fn tiny_page_puts_every_row_on_its_own_page() {
        let cfg = LayoutConfig {
            columns_per_row: 2,
            page_height: 60.0,
            ..LayoutConfig::default()
        };
        let result = paginate(&entries(5), &cfg, &StubRenderer::new());
        assert_eq!(
            positions(&result),
            vec![
                (0, 18.0, 20.0),
                (0, 54.0, 20.0),
                (1, 18.0, 20.0),
                (1, 54.0, 20.0),
                (2, 18.0, 20.0),
            ]
        );
    }

    #[test]
    fn zero_columns_does_not_panic() {
        let cfg = LayoutConfig {
            columns_per_row: 0,
            ..LayoutConfig::default()
        };
        let result = paginate(&entries(3), &cfg, &StubRenderer::new());
        assert_eq!(result.placements.len(), 3);
        assert!(result.placements.iter().all(|p| p.x == 18.0));
    }

    #[test]
    fn positions_are_unique() {
        let cfg = LayoutConfig {
            columns_per_row: 3,
            page_height: 150.0,
            ..LayoutConfig::default()
        };
        let result = paginate(&entries(40), &cfg, &StubRenderer::failing_on(&["V7", "V20"]));
        let unique: HashSet<(usize, u32, u32)> = result
            .placements
            .iter()
            .map(|p| (p.page, p.x.to_bits(), p.y.to_bits()))
            .collect();
        assert_eq!(unique.len(), result.placements.len());
        assert_eq!(result.placements.len(), 38);
    }

    #[test]
    fn pagination_is_deterministic() {
        let cfg = LayoutConfig::default();
        let input = entries(12);
        let first = paginate(&input, &cfg, &StubRenderer::failing_on(&["V5"]));
        let second = paginate(&input, &cfg, &StubRenderer::failing_on(&["V5"]));
        assert_eq!(first, second);
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_geometry() {
        let bad = [
            LayoutConfig {
                glyph_size: 0.0,
                ..LayoutConfig::default()
            },
            LayoutConfig {
                margin: -1.0,
                ..LayoutConfig::default()
            },
            LayoutConfig {
                columns_per_row: 0,
                ..LayoutConfig::default()
            },
            LayoutConfig {
                glyph_pixels: 0,
                ..LayoutConfig::default()
            },
            LayoutConfig {
                page_height: 40.0,
                ..LayoutConfig::default()
            },
            LayoutConfig {
                start_x: f32::NAN,
                ..LayoutConfig::default()
            },
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(), Err(AppError::Layout(_))), "{:?}", cfg);
        }
    }
}
