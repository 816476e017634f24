//! Source discovery: find export files to normalize.
//!
//! This module handles the first stage of the pipeline - locating raw
//! metrology exports under a directory tree. Report and metadata files are
//! skipped; everything else is matched by filename keywords.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sigmachecklib::source::{search_files, LocatorConfig};
//!
//! let config = LocatorConfig::new().keywords(["LOT123", "W01"]);
//! let files = search_files("/data/metrology", &config);
//! ```

pub mod locator;

pub use locator::{search_files, LocatorConfig, REPORT_EXTENSIONS};
