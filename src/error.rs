// qrsheet-pdf: error types shared by every stage of a pass

use std::fmt;

use thiserror::Error;

/// Which of the two user-selected columns a lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Label,
    Value,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Label => write!(f, "label"),
            ColumnRole::Value => write!(f, "value"),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to read spreadsheet: {0}")]
    Decode(String),
    #[error("Spreadsheet needs a header row and at least one data row")]
    NoData,
    #[error("{role} column \"{column}\" not found in header row")]
    ColumnNotFound { role: ColumnRole, column: String },
    #[error("A spreadsheet and both column names are required before exporting")]
    NotReady,
    #[error("Failed to generate QR code: {0}")]
    Glyph(String),
    #[error("Invalid layout: {0}")]
    Layout(String),
    #[error("Failed to create PDF: {0}")]
    Pdf(String),
    #[error("Failed to write manifest: {0}")]
    Manifest(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_not_found_names_role_and_column() {
        let err = AppError::ColumnNotFound {
            role: ColumnRole::Value,
            column: "Code".to_string(),
        };
        assert_eq!(err.to_string(), "value column \"Code\" not found in header row");
    }
}
