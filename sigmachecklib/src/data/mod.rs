//! Tabular data: the common shape every stage reads and writes.
//!
//! This module provides:
//!
//! - **Cells**: a tagged value (`Text`, `Number`, `Missing`) so mixed columns
//!   never rely on implicit coercion
//! - **Tables**: ordered, equally long, uniquely named columns, parsed from
//!   and written to comma-delimited text
//!
//! ## Example
//!
//! ```rust
//! use sigmachecklib::data::{Cell, Table};
//!
//! let table = Table::parse_csv_str("Site,THK\n1,101.2\n2,NA\n").unwrap();
//! assert_eq!(table.column("THK").unwrap().cells[1], Cell::Missing);
//! ```

pub mod cell;
pub mod table;

pub use cell::Cell;
pub use table::{unique_headers, Column, CsvMode, Table};
