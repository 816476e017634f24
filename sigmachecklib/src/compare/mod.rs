//! Comparison: align raw and Sigma columns and collect the results.
//!
//! This module handles the fourth stage of the pipeline. It provides:
//!
//! - **Comparator**: site-by-site alignment of two columns of any length
//! - **Session**: the accumulator that places repeated comparisons side by side
//!
//! ## Example
//!
//! ```rust
//! use sigmachecklib::compare::ComparisonSession;
//! use sigmachecklib::data::Table;
//!
//! let raw = Table::parse_csv_str("THK\n100\n101\n").unwrap();
//! let sigma = Table::parse_csv_str("TEST_VALUE\n100\n").unwrap();
//!
//! let mut session = ComparisonSession::new();
//! let comparison = session.compare_and_append(&raw, "THK", &sigma, "TEST_VALUE").unwrap();
//! assert_eq!(comparison.rows.len(), 2);
//! assert!(!comparison.rows[1].matched);
//! ```

pub mod comparator;
pub mod session;

pub use comparator::{compare_columns, validate_columns, ComparisonRow, ComparisonTable};
pub use session::ComparisonSession;
