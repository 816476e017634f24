//! Output: export accumulated comparisons.
//!
//! This module handles the last stage of the pipeline - writing the session
//! table to a single-sheet workbook or to CSV. Header de-duplication lives
//! here because exported columns from repeated comparisons repeat names.

pub mod export;

pub use export::{dedupe_headers, export_csv, export_xlsx, EXPORT_SHEET_NAME};
