//! Normalization: turn raw exports into clean tables.
//!
//! This module handles the second stage of the pipeline. Each export dialect
//! gets its own [`Normalizer`], chosen from the file extension by
//! [`dialect_of`]:
//!
//! - **CST logs** (`.CST`): comment lines dropped, fields split on whitespace
//! - **Sectioned CSV** (`.csv`): preamble and statistics blocks removed, then
//!   any instrument header block stripped
//! - **Plain** (anything else): loaded as delimited text without cleaning
//!
//! Cleaning never aborts on a bad stage. The CSV pipeline falls back to the
//! least-processed input that still loads and reports the stage it reached
//! in [`Normalized::stage`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use sigmachecklib::normalize::{normalize_file, CleanStage};
//! use sigmachecklib::WorkArea;
//!
//! let normalized = normalize_file("LOT1_W01.csv".as_ref(), &WorkArea::new("."))?;
//! if normalized.stage != CleanStage::FullyCleaned {
//!     eprintln!("partially cleaned: {:?}", normalized.warnings);
//! }
//! ```

pub mod cst;
pub mod header;
pub mod sectioned;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::data::{CsvMode, Table};
use crate::error::SigmaCheckError;
use crate::options::WorkArea;
use crate::Result;

pub use cst::FixedWidthLogCleaner;
pub use header::{HeaderBlockStripper, HEADER_SENTINEL};
pub use sectioned::{SectionedCsvCleaner, PREAMBLE_LABELS, STATISTICS_LABELS};

/// A recognized export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    /// Whitespace-separated CST instrument log
    FixedWidthLog,
    /// CSV with preambles, statistics blocks, and header blocks
    SectionedCsv,
    /// Delimited text loaded as-is
    Plain,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::FixedWidthLog => "cst",
            Dialect::SectionedCsv => "sectioned-csv",
            Dialect::Plain => "plain",
        };
        f.write_str(name)
    }
}

/// Pick the dialect for a file extension (without the dot, any case).
pub fn dialect_of(extension: &str) -> Dialect {
    if extension.eq_ignore_ascii_case("cst") {
        Dialect::FixedWidthLog
    } else if extension.eq_ignore_ascii_case("csv") {
        Dialect::SectionedCsv
    } else {
        Dialect::Plain
    }
}

/// How far cleaning got before the table was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CleanStage {
    /// Every stage for the dialect succeeded
    FullyCleaned,
    /// Sections were cleaned but the header block stage failed
    SectionsOnly,
    /// Section cleaning failed; only the header block was stripped
    HeaderStrippedOnly,
    /// No cleaning applied
    Raw,
}

/// A normalized table plus a record of how it was produced.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub table: Table,
    pub dialect: Dialect,
    pub stage: CleanStage,
    /// File the table was finally loaded from
    pub source: PathBuf,
    /// Messages from stages that failed and were skipped
    pub warnings: Vec<String>,
}

/// A cleaning strategy for one dialect.
pub trait Normalizer {
    fn dialect(&self) -> Dialect;

    /// Clean `input`, writing intermediates into `work`, and load the result.
    fn normalize(&self, input: &Path, work: &WorkArea) -> Result<Normalized>;
}

/// Normalizer for CST logs: tokenize into the cleaned file, then load it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CstNormalizer;

impl Normalizer for CstNormalizer {
    fn dialect(&self) -> Dialect {
        Dialect::FixedWidthLog
    }

    fn normalize(&self, input: &Path, work: &WorkArea) -> Result<Normalized> {
        let cleaned = work.cleaned_path();
        FixedWidthLogCleaner::new().clean(input, &cleaned)?;
        let table = Table::read_csv(&cleaned, CsvMode::Lenient)?;

        Ok(Normalized {
            table,
            dialect: self.dialect(),
            stage: CleanStage::FullyCleaned,
            source: cleaned,
            warnings: Vec::new(),
        })
    }
}

/// Normalizer for sectioned CSV exports.
///
/// Runs the section cleaner into the intermediate file, then the header
/// stripper into the cleaned file. A failed stage is skipped and the next
/// one works from the best file available.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionedCsvNormalizer;

impl Normalizer for SectionedCsvNormalizer {
    fn dialect(&self) -> Dialect {
        Dialect::SectionedCsv
    }

    fn normalize(&self, input: &Path, work: &WorkArea) -> Result<Normalized> {
        if !input.exists() {
            return Err(SigmaCheckError::FileNotFound(input.to_path_buf()));
        }

        let mut warnings = Vec::new();

        let intermediate = work.intermediate_path();
        let sections_cleaned = match SectionedCsvCleaner::new().clean(input, &intermediate) {
            Ok(_) => true,
            Err(e) => {
                warn!(input = %input.display(), error = %e, "section cleaning failed, using original file");
                warnings.push(format!("section cleaning failed: {}", e));
                false
            }
        };
        let stage_one = if sections_cleaned {
            intermediate
        } else {
            input.to_path_buf()
        };

        let cleaned = work.cleaned_path();
        let (source, stage) = match HeaderBlockStripper::new().strip(&stage_one, &cleaned) {
            Ok(_) if sections_cleaned => (cleaned, CleanStage::FullyCleaned),
            Ok(_) => (cleaned, CleanStage::HeaderStrippedOnly),
            Err(e) => {
                warn!(input = %stage_one.display(), error = %e, "header stripping failed");
                warnings.push(format!("header stripping failed: {}", e));
                let stage = if sections_cleaned {
                    CleanStage::SectionsOnly
                } else {
                    CleanStage::Raw
                };
                (stage_one, stage)
            }
        };

        let table = Table::read_csv(&source, CsvMode::Lenient)?;

        Ok(Normalized {
            table,
            dialect: self.dialect(),
            stage,
            source,
            warnings,
        })
    }
}

/// Normalizer for files with no known dialect: load without cleaning.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainNormalizer;

impl Normalizer for PlainNormalizer {
    fn dialect(&self) -> Dialect {
        Dialect::Plain
    }

    fn normalize(&self, input: &Path, _work: &WorkArea) -> Result<Normalized> {
        let table = Table::read_csv(input, CsvMode::Lenient)?;
        Ok(Normalized {
            table,
            dialect: self.dialect(),
            stage: CleanStage::Raw,
            source: input.to_path_buf(),
            warnings: Vec::new(),
        })
    }
}

/// Return the normalizer for a dialect.
pub fn normalizer_for(dialect: Dialect) -> Box<dyn Normalizer> {
    match dialect {
        Dialect::FixedWidthLog => Box::new(CstNormalizer),
        Dialect::SectionedCsv => Box::new(SectionedCsvNormalizer),
        Dialect::Plain => Box::new(PlainNormalizer),
    }
}

/// Normalize a raw export, choosing the dialect from its extension.
pub fn normalize_file(input: &Path, work: &WorkArea) -> Result<Normalized> {
    let extension = input
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dialect = dialect_of(&extension);

    work.ensure_dir()?;
    let normalized = normalizer_for(dialect).normalize(input, work)?;

    info!(
        input = %input.display(),
        dialect = %dialect,
        stage = ?normalized.stage,
        rows = normalized.table.row_count(),
        columns = normalized.table.column_count(),
        "normalized export"
    );
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_dialect_of() {
        assert_eq!(dialect_of("CST"), Dialect::FixedWidthLog);
        assert_eq!(dialect_of("cst"), Dialect::FixedWidthLog);
        assert_eq!(dialect_of("csv"), Dialect::SectionedCsv);
        assert_eq!(dialect_of("CSV"), Dialect::SectionedCsv);
        assert_eq!(dialect_of("txt"), Dialect::Plain);
        assert_eq!(dialect_of(""), Dialect::Plain);
    }

    #[test]
    fn test_normalizer_for_matches_dialect() {
        for dialect in [Dialect::FixedWidthLog, Dialect::SectionedCsv, Dialect::Plain] {
            assert_eq!(normalizer_for(dialect).dialect(), dialect);
        }
    }

    #[test]
    fn test_cst_pipeline() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("LOT1_W01.CST");
        fs::write(&input, "# exported by tool\nSite THK\n1 100.5\n2 99.5\n").unwrap();

        let work = WorkArea::new(dir.path().join("work"));
        let normalized = normalize_file(&input, &work).unwrap();

        assert_eq!(normalized.dialect, Dialect::FixedWidthLog);
        assert_eq!(normalized.stage, CleanStage::FullyCleaned);
        assert_eq!(normalized.source, work.cleaned_path());
        assert_eq!(normalized.table.column_names(), vec!["Site", "THK"]);
        assert_eq!(
            normalized.table.column("THK").unwrap().cells,
            vec![Cell::Number(100.5), Cell::Number(99.5)]
        );
    }

    #[test]
    fn test_csv_pipeline_fully_cleaned() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("LOT1_W01.csv");
        fs::write(
            &input,
            "Lot ID: LOT1\nWafer ID: 01\nSite,THK\n1,100\n2,101\nStatistics\nMean,100.5\n\n",
        )
        .unwrap();

        let work = WorkArea::new(dir.path());
        let normalized = normalize_file(&input, &work).unwrap();

        assert_eq!(normalized.stage, CleanStage::FullyCleaned);
        assert!(normalized.warnings.is_empty());
        assert_eq!(normalized.table.column_names(), vec!["Site", "THK"]);
        assert_eq!(normalized.table.row_count(), 2);
        assert!(work.intermediate_path().exists());
    }

    #[test]
    fn test_csv_pipeline_falls_back_to_header_strip() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("export.csv");
        fs::write(
            &input,
            "Instrument Export\nEnd Header Data\nSite,THK,Unit\n1,100,A\n2,101,A\n",
        )
        .unwrap();

        let work = WorkArea::new(dir.path());
        let normalized = normalize_file(&input, &work).unwrap();

        assert_eq!(normalized.stage, CleanStage::HeaderStrippedOnly);
        assert_eq!(normalized.warnings.len(), 1);
        assert_eq!(normalized.table.column_names(), vec!["Site", "THK", "Unit"]);
        assert_eq!(normalized.table.row_count(), 2);
    }

    #[test]
    fn test_csv_pipeline_header_block_after_sections() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("export.csv");
        // header block wide enough that section cleaning still parses it
        fs::write(
            &input,
            "Tool,Recipe\nEnd Header Data\nSite,THK\n1,100\n",
        )
        .unwrap();

        let work = WorkArea::new(dir.path());
        let normalized = normalize_file(&input, &work).unwrap();

        // section cleaning rewrites the file, so the sentinel no longer has
        // its own line and the header row survives as data
        assert_eq!(normalized.stage, CleanStage::FullyCleaned);
        assert_eq!(normalized.table.column_names(), vec!["Tool", "Recipe"]);
    }

    #[test]
    fn test_plain_dialect_loads_directly() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("data.txt");
        fs::write(&input, "A,B\n1,2\n").unwrap();

        let normalized = normalize_file(&input, &WorkArea::new(dir.path())).unwrap();

        assert_eq!(normalized.dialect, Dialect::Plain);
        assert_eq!(normalized.stage, CleanStage::Raw);
        assert_eq!(normalized.source, input);
        assert_eq!(normalized.table.row_count(), 1);
    }

    #[test]
    fn test_missing_input_reported() {
        let dir = tempdir().unwrap();
        let work = WorkArea::new(dir.path());

        for name in ["none.csv", "none.CST", "none.txt"] {
            let result = normalize_file(&dir.path().join(name), &work);
            assert!(result.unwrap_err().is_not_found(), "{}", name);
        }
    }
}
