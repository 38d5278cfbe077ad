//! qrsheet-pdf: turn two spreadsheet columns into a printable PDF grid of
//! labelled QR codes.
//!
//! A pass reads the first sheet of a workbook ([`sheet`]), pulls out one
//! label/value [`Entry`] per row ([`extract`]), renders a QR glyph for every
//! value while assigning it a page and grid position ([`layout`]), and finally
//! draws the placements into a PDF ([`document`]).

pub mod document;
pub mod error;
pub mod extract;
pub mod glyph;
pub mod layout;
pub mod manifest;
pub mod preview;
pub mod session;
pub mod sheet;

pub use error::{AppError, ColumnRole};
pub use extract::{extract, Entry};
pub use glyph::{GlyphRenderer, QrGlyphRenderer};
pub use layout::{paginate, GlyphFailure, LayoutConfig, Pagination, Placement};
pub use session::{ExportPass, ExportResults, PassOutcome, Session};
