//! Cleaner for sectioned CSV exports.
//!
//! These exports wrap the data table in a preamble of `Label: value` lines
//! and follow each section with a statistics block (`Statistics`, `Max`,
//! `Mean`, ...) that runs until the next blank line.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::data::{CsvMode, Table};
use crate::error::SigmaCheckError;
use crate::Result;

/// Preamble field labels dropped wherever a line starts with one.
pub const PREAMBLE_LABELS: &[&str] = &[
    "Date/Time:",
    "Film name:",
    "Stage group:",
    "Lot ID:",
    "Wafer ID:",
    "Cassette recipe name:",
    "Wafer recipe name:",
    "Stage recipe name:",
];

/// Labels that open a statistics block.
pub const STATISTICS_LABELS: &[&str] = &[
    "Statistics",
    "Max",
    "Min",
    "Range",
    "Mean",
    "StdD",
    "%StdD",
    "%NonU",
    "CTE",
];

static PREAMBLE_LINE: Lazy<Regex> = Lazy::new(|| anchored_alternation(PREAMBLE_LABELS));
static STATISTICS_LINE: Lazy<Regex> = Lazy::new(|| anchored_alternation(STATISTICS_LABELS));

fn anchored_alternation(labels: &[&str]) -> Regex {
    let body = labels
        .iter()
        .map(|label| regex::escape(label))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("^(?:{})", body)).expect("escaped labels form a valid pattern")
}

/// Strips preambles and statistics blocks, then parses what is left.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionedCsvCleaner;

impl SectionedCsvCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Drop preamble lines and statistics blocks, keeping line endings.
    ///
    /// A statistics block starts at a line beginning with a statistics label
    /// and ends with (and includes) the next blank line.
    pub fn strip_sections(&self, text: &str) -> String {
        let mut kept = String::with_capacity(text.len());
        let mut skipping = false;

        for line in text.split_inclusive('\n') {
            if PREAMBLE_LINE.is_match(line) {
                continue;
            }
            if STATISTICS_LINE.is_match(line) {
                skipping = true;
            }
            if !skipping {
                kept.push_str(line);
            } else if line.trim().is_empty() {
                skipping = false;
            }
        }

        kept
    }

    /// Clean already-loaded text into a table.
    ///
    /// `origin` is only used to label parse errors.
    pub fn clean_text(&self, text: &str, origin: &Path) -> Result<Table> {
        let stripped = self.strip_sections(text);
        let table = Table::parse_csv_text(&stripped, CsvMode::Strict, origin)?;

        // Catch statistics rows that sat inside a section rather than after it
        let keep: Vec<usize> = table
            .rows()
            .enumerate()
            .filter(|(_, row)| !row.iter().any(|cell| mentions_statistics(&cell.as_display())))
            .map(|(index, _)| index)
            .collect();

        if keep.len() < table.row_count() {
            debug!(
                dropped = table.row_count() - keep.len(),
                "dropped embedded statistics rows"
            );
        }

        Ok(table.select_rows(&keep))
    }

    /// Clean `input` and write the resulting table to `output`.
    pub fn clean(&self, input: &Path, output: &Path) -> Result<Table> {
        let text = fs::read_to_string(input).map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => SigmaCheckError::ParseFailure {
                path: input.to_path_buf(),
                message: e.to_string(),
            },
            _ => SigmaCheckError::from_io(input, e),
        })?;

        let table = self.clean_text(&text, input)?;
        table.write_csv(output)?;

        info!(
            input = %input.display(),
            output = %output.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "cleaned sectioned CSV"
        );
        Ok(table)
    }
}

fn mentions_statistics(value: &str) -> bool {
    STATISTICS_LABELS.iter().any(|label| value.contains(label))
}
