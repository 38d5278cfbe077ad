// qrsheet-pdf: results listing and preview images

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::extract::Entry;
use crate::glyph::GlyphRenderer;
use crate::session::ExportResults;

/// Preview glyph edge in pixels
pub const PREVIEW_PIXELS: u32 = 128;

const SLOT_PREFIX: &str = "qr-";
const SLOT_SUFFIX: &str = ".png";

/// One indexed preview output.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSlot {
    pub index: usize,
    pub label: String,
    pub outcome: Result<PathBuf, String>,
}

pub fn slot_file_name(index: usize) -> String {
    format!("{}{:04}{}", SLOT_PREFIX, index, SLOT_SUFFIX)
}

/// Write one PNG per entry into `dir`, keyed by entry index.
///
/// Slot files left over from an earlier run are removed first. A slot whose glyph
/// cannot be rendered or saved is reported in its [`PreviewSlot::outcome`]; the
/// remaining slots are still written.
pub fn write_previews<R>(
    dir: &Path,
    entries: &[Entry],
    renderer: &R,
    size: u32,
) -> Result<Vec<PreviewSlot>, AppError>
where
    R: GlyphRenderer + ?Sized,
{
    fs::create_dir_all(dir)?;
    clear_slots(dir)?;

    let slots = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let path = dir.join(slot_file_name(index));
            let outcome = renderer
                .render(&entry.value, size)
                .and_then(|image| {
                    image
                        .save(&path)
                        .map_err(|e| AppError::Glyph(format!("{}: {}", path.display(), e)))
                })
                .map(|()| path)
                .map_err(|e| {
                    log::warn!("Preview for \"{}\" failed: {}", entry.label, e);
                    e.to_string()
                });
            PreviewSlot {
                index,
                label: entry.label.clone(),
                outcome,
            }
        })
        .collect();

    Ok(slots)
}

fn clear_slots(dir: &Path) -> Result<(), AppError> {
    for item in fs::read_dir(dir)? {
        let path = item?.path();
        let is_slot = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(is_slot_file_name)
            .unwrap_or(false);
        if is_slot && path.is_file() {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Matches only names [`slot_file_name`] produces: the prefix, digits, the suffix.
fn is_slot_file_name(name: &str) -> bool {
    name.strip_prefix(SLOT_PREFIX)
        .and_then(|rest| rest.strip_suffix(SLOT_SUFFIX))
        .map(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

/// One line per entry: where it landed on the sheet, or why it was skipped.
pub fn listing(results: &ExportResults) -> Vec<String> {
    let placements = &results.pagination.placements;
    let failures = &results.pagination.failures;
    let mut placed = placements.iter();
    let mut failed = failures.iter().peekable();

    results
        .entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let position = match failed.next_if(|f| f.index == index) {
                Some(failure) => format!("skipped: {}", failure.reason),
                None => match placed.next() {
                    Some(p) => format!("page {} at ({:.0}, {:.0}) mm", p.page + 1, p.x, p.y),
                    None => "not placed".to_string(),
                },
            };
            format!(
                "{:>4}. {} [{}] {}",
                index + 1,
                display_label(&entry.label),
                entry.value,
                position
            )
        })
        .collect()
}

fn display_label(label: &str) -> &str {
    if label.is_empty() {
        "(no label)"
    } else {
        label
    }
}
