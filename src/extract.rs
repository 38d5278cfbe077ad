// qrsheet-pdf: label/value extraction from decoded rows

use serde::Serialize;

use crate::error::{AppError, ColumnRole};
use crate::sheet::Row;

/// A label/value pair destined for one QR glyph. `value` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub label: String,
    pub value: String,
}

/// Map every data row to an [`Entry`], using the header row to find the two columns.
///
/// Rows whose value cell is empty (or missing) are dropped; order is preserved.
/// Fewer than two rows yields [`AppError::NoData`].
pub fn extract(
    rows: &[Row],
    label_column: &str,
    value_column: &str,
) -> Result<Vec<Entry>, AppError> {
    let (header, data) = match rows {
        [header, data @ ..] if !data.is_empty() => (header, data),
        _ => return Err(AppError::NoData),
    };

    let label_index = column_index(header, label_column, ColumnRole::Label)?;
    let value_index = column_index(header, value_column, ColumnRole::Value)?;

    let entries = data
        .iter()
        .filter_map(|row| {
            let value = cell(row, value_index);
            if value.is_empty() {
                return None;
            }
            Some(Entry {
                label: cell(row, label_index).to_string(),
                value: value.to_string(),
            })
        })
        .collect();

    Ok(entries)
}

fn column_index(header: &Row, name: &str, role: ColumnRole) -> Result<usize, AppError> {
    header
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| AppError::ColumnNotFound {
            role,
            column: name.to_string(),
        })
}

fn cell(row: &Row, index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}
