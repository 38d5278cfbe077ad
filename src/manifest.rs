// qrsheet-pdf: JSON record of where each QR code was placed

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::error::AppError;
use crate::layout::{GlyphFailure, LayoutConfig, Pagination, Placement};

#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub source: &'a str,
    pub label_column: &'a str,
    pub value_column: &'a str,
    pub layout: &'a LayoutConfig,
    pub pages: usize,
    pub placements: &'a [Placement],
    pub failures: &'a [GlyphFailure],
}

impl<'a> Manifest<'a> {
    pub fn new(
        source: &'a str,
        label_column: &'a str,
        value_column: &'a str,
        layout: &'a LayoutConfig,
        pagination: &'a Pagination,
    ) -> Self {
        Self {
            source,
            label_column,
            value_column,
            layout,
            pages: pagination.page_count(),
            placements: &pagination.placements,
            failures: &pagination.failures,
        }
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string_pretty(self).map_err(|e| AppError::Manifest(e.to_string()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AppError> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| AppError::Manifest(format!("{}: {}", path.display(), e)))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .map_err(|e| AppError::Manifest(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Entry;
    use ::image::RgbImage;

    #[test]
    fn serializes_positions_without_glyph_pixels() {
        let layout = LayoutConfig::default();
        let pagination = Pagination {
            placements: vec![Placement {
                entry: Entry {
                    label: "A".to_string(),
                    value: "123".to_string(),
                },
                page: 0,
                x: 18.0,
                y: 20.0,
                glyph: RgbImage::new(4, 4),
            }],
            failures: vec![GlyphFailure {
                index: 1,
                entry: Entry {
                    label: "B".to_string(),
                    value: "456".to_string(),
                },
                reason: "too long".to_string(),
            }],
        };

        let json = Manifest::new("codes.xlsx", "Name", "Code", &layout, &pagination)
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["pages"], 1);
        assert_eq!(value["placements"][0]["entry"]["value"], "123");
        assert_eq!(value["placements"][0]["x"], 18.0);
        assert!(value["placements"][0].get("glyph").is_none());
        assert_eq!(value["failures"][0]["index"], 1);
        assert_eq!(value["layout"]["columns_per_row"], 5);
    }
}
