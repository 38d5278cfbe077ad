// qrsheet-pdf: spreadsheet decoding

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::error::AppError;

/// One spreadsheet row, every cell coerced to text.
pub type Row = Vec<String>;

/// Read a spreadsheet from disk and decode its first sheet.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Row>, AppError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::Decode(format!("{}: {}", path.display(), e)))?;
    decode(&bytes)
}

/// Decode raw workbook bytes (xlsx, xlsm, xlsb, xls or ods) into rows of strings.
///
/// Only the first sheet is read. Empty and error cells become `""`, so every row
/// spans the full width of the sheet's used range.
pub fn decode(bytes: &[u8]) -> Result<Vec<Row>, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| AppError::Decode(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::Decode("No sheets found in workbook".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AppError::Decode(format!("{}: {}", sheet_name, e)))?;

    let rows: Vec<Row> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    log::debug!(
        "Decoded sheet '{}': {} rows x {} columns",
        sheet_name,
        range.height(),
        range.width()
    );

    Ok(rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        // f64's Display already drops a trailing ".0"
        Data::Float(f) => f.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        other => other.to_string(),
    }
}
