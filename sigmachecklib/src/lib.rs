//! # sigmachecklib
//!
//! A library for checking raw semiconductor-metrology exports against the
//! Sigma reference data held in a measurement database.
//!
//! ## Overview
//!
//! Metrology tools export their measurements in several loosely structured
//! text dialects. This library turns those exports into a single rectangular
//! [`Table`] and compares a chosen column against the matching Sigma data.
//!
//! The pipeline runs in stages:
//!
//! - **Source**: find export files by filename keywords ([`search_files`])
//! - **Normalize**: clean each dialect into a table ([`normalize_file`])
//! - **Query**: narrow tables by column or row keywords ([`filter_columns`], [`filter_rows`])
//! - **Compare**: align two columns site by site ([`compare_columns`])
//! - **Output**: accumulate comparisons and export them ([`ComparisonSession`], [`export_xlsx`])
//!
//! Sigma data comes in through the [`SigmaSource`] trait, which keeps database
//! connectivity outside the library.
//!
//! ## Example
//!
//! ```rust
//! use sigmachecklib::{compare_columns, normalize_file, ComparisonSession, Table, WorkArea};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! let export = dir.path().join("LOT1_W01.csv");
//! fs::write(
//!     &export,
//!     "Lot ID: LOT1\nSite,Thickness\n1,101.5\n2,99.8\nStatistics\nMean,100.65\n\n",
//! )
//! .unwrap();
//!
//! let work = WorkArea::new(dir.path());
//! let raw = normalize_file(&export, &work).unwrap().table;
//! assert_eq!(raw.row_count(), 2);
//!
//! let sigma = Table::parse_csv_str("TEST_VALUE\n101.5\n99.8\n").unwrap();
//! let comparison = compare_columns(&raw, "Thickness", &sigma, "TEST_VALUE").unwrap();
//! assert!(comparison.rows.iter().all(|r| r.matched));
//!
//! let mut session = ComparisonSession::new();
//! session.append(comparison);
//! assert_eq!(session.to_table().column_count(), 4);
//! ```

pub mod compare;
pub mod data;
pub mod error;
pub mod normalize;
pub mod options;
pub mod output;
pub mod query;
pub mod sigma;
pub mod source;

pub use compare::{compare_columns, ComparisonRow, ComparisonSession, ComparisonTable};
pub use data::{Cell, Column, Table};
pub use error::SigmaCheckError;
pub use normalize::{
    dialect_of, normalize_file, normalizer_for, CleanStage, Dialect, FixedWidthLogCleaner,
    HeaderBlockStripper, Normalized, Normalizer, SectionedCsvCleaner,
};
pub use options::{parse_keywords, WorkArea};
pub use output::{dedupe_headers, export_csv, export_xlsx, EXPORT_SHEET_NAME};
pub use query::{filter_columns, filter_rows};
pub use sigma::{fetch_sigma, SigmaQuery, SigmaSource, SnapshotSigmaSource, SIGMA_QUERY};
pub use source::{search_files, LocatorConfig};

/// Result type for sigmachecklib operations
pub type Result<T> = std::result::Result<T, SigmaCheckError>;
