//! Query processing: narrow tables down to the data being compared.
//!
//! This module handles the third stage of the pipeline. Raw exports and
//! Sigma result sets both carry far more columns and rows than a single
//! comparison needs, so the shell narrows them with keyword lists first.
//!
//! ## Example
//!
//! ```rust
//! use sigmachecklib::data::Table;
//! use sigmachecklib::query::{filter_columns, filter_rows};
//!
//! let table = Table::parse_csv_str("Site,THK_P01,RI_P01\n1,100,1.4\n2,101,1.5\n").unwrap();
//! assert_eq!(filter_columns(&table, &["thk"]).column_names(), vec!["THK_P01"]);
//! assert_eq!(filter_rows(&table, &["101"]).row_count(), 1);
//! ```

pub mod filter;

pub use filter::{filter_columns, filter_rows};
