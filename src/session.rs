// qrsheet-pdf: session state and export passes

use crate::error::AppError;
use crate::extract::{extract, Entry};
use crate::glyph::GlyphRenderer;
use crate::layout::{paginate, LayoutConfig, Pagination};
use crate::sheet::{self, Row};

/// What the results area shows after a pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportResults {
    pub entries: Vec<Entry>,
    pub pagination: Pagination,
}

/// State owned by the user-facing surface.
///
/// Every user action replaces one part of it wholesale. Results are only replaced
/// when a pass commits, and only by the newest pass.
#[derive(Debug, Default)]
pub struct Session {
    file_name: Option<String>,
    rows: Vec<Row>,
    label_column: String,
    value_column: String,
    results: ExportResults,
    latest_pass: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an uploaded spreadsheet. A decode failure clears rows and results.
    pub fn upload(&mut self, name: &str, bytes: &[u8]) -> Result<usize, AppError> {
        self.file_name = Some(name.to_string());
        match sheet::decode(bytes) {
            Ok(rows) => {
                self.rows = rows;
                Ok(self.rows.len())
            }
            Err(e) => {
                self.rows = Vec::new();
                self.results = ExportResults::default();
                Err(e)
            }
        }
    }

    pub fn set_label_column(&mut self, column: &str) {
        self.label_column = column.to_string();
    }

    pub fn set_value_column(&mut self, column: &str) {
        self.value_column = column.to_string();
    }

    /// Whether the export trigger is enabled.
    pub fn can_export(&self) -> bool {
        self.file_name.is_some() && !self.label_column.is_empty() && !self.value_column.is_empty()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn results(&self) -> &ExportResults {
        &self.results
    }

    /// Start a pass: extract entries and take a ticket that supersedes earlier passes.
    ///
    /// Extraction errors abort before any glyph is rendered and leave results as they were.
    pub fn begin_export(&mut self) -> Result<ExportPass, AppError> {
        if !self.can_export() {
            return Err(AppError::NotReady);
        }
        let entries = extract(&self.rows, &self.label_column, &self.value_column)?;
        self.latest_pass += 1;
        log::debug!("Export pass {} started with {} entries", self.latest_pass, entries.len());
        Ok(ExportPass {
            ticket: self.latest_pass,
            entries,
        })
    }

    /// Replace results with a finished pass. Outcomes from superseded passes are
    /// discarded and `false` is returned.
    pub fn commit(&mut self, outcome: PassOutcome) -> bool {
        if outcome.ticket != self.latest_pass {
            log::info!(
                "Discarding results of pass {} superseded by pass {}",
                outcome.ticket,
                self.latest_pass
            );
            return false;
        }
        self.results = outcome.results;
        true
    }
}

/// Entries captured for one pass. Runs independently of the session.
#[derive(Debug, Clone)]
pub struct ExportPass {
    ticket: u64,
    entries: Vec<Entry>,
}

impl ExportPass {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn run<R>(self, cfg: &LayoutConfig, renderer: &R) -> PassOutcome
    where
        R: GlyphRenderer + ?Sized,
    {
        let pagination = paginate(&self.entries, cfg, renderer);
        PassOutcome {
            ticket: self.ticket,
            results: ExportResults {
                entries: self.entries,
                pagination,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct PassOutcome {
    ticket: u64,
    pub results: ExportResults,
}
