//! Input options shared by the normalization and session stages.
//!
//! This module contains the configuration types that decide where
//! intermediate files are written and how keyword lists are read.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SigmaCheckError;
use crate::Result;

/// Default name of the first-stage CSV output.
pub const DEFAULT_INTERMEDIATE_FILE: &str = "intermediate_cleaned_data.csv";
/// Default name of the final cleaned table.
pub const DEFAULT_CLEANED_FILE: &str = "cleaned_data.csv";
/// Default name of the persisted comparison session.
pub const DEFAULT_SESSION_FILE: &str = "comparison_session.json";
/// Default name of the spreadsheet export.
pub const DEFAULT_EXPORT_FILE: &str = "comparison_results.xlsx";

/// Working directory plus the fixed file names used to hand data between stages.
///
/// The names are fixed per work area, so two sessions sharing a directory
/// will overwrite each other's intermediates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkArea {
    /// Directory that receives every intermediate file
    pub dir: PathBuf,
    /// File written by the sectioned CSV cleaner
    pub intermediate_file: String,
    /// File holding the final cleaned table
    pub cleaned_file: String,
    /// File holding the serialized comparison session
    pub session_file: String,
}

impl Default for WorkArea {
    fn default() -> Self {
        Self::new(".")
    }
}

impl WorkArea {
    /// Create a work area rooted at `dir` with the default file names.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            intermediate_file: DEFAULT_INTERMEDIATE_FILE.to_string(),
            cleaned_file: DEFAULT_CLEANED_FILE.to_string(),
            session_file: DEFAULT_SESSION_FILE.to_string(),
        }
    }

    /// Builder: override the intermediate file name
    pub fn with_intermediate_file(mut self, name: impl Into<String>) -> Self {
        self.intermediate_file = name.into();
        self
    }

    /// Builder: override the cleaned file name
    pub fn with_cleaned_file(mut self, name: impl Into<String>) -> Self {
        self.cleaned_file = name.into();
        self
    }

    /// Builder: override the session file name
    pub fn with_session_file(mut self, name: impl Into<String>) -> Self {
        self.session_file = name.into();
        self
    }

    /// Create the work directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| SigmaCheckError::from_io(&self.dir, e))
    }

    pub fn intermediate_path(&self) -> PathBuf {
        self.dir.join(&self.intermediate_file)
    }

    pub fn cleaned_path(&self) -> PathBuf {
        self.dir.join(&self.cleaned_file)
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(&self.session_file)
    }
}

/// Split comma-separated keyword input into a keyword list.
///
/// Surrounding whitespace is trimmed and empty entries are dropped, so
/// `"LOT1, ,w01"` yields `["LOT1", "w01"]`.
pub fn parse_keywords(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_area_defaults() {
        let work = WorkArea::new("/tmp/run");
        assert_eq!(
            work.intermediate_path(),
            PathBuf::from("/tmp/run/intermediate_cleaned_data.csv")
        );
        assert_eq!(work.cleaned_path(), PathBuf::from("/tmp/run/cleaned_data.csv"));
        assert_eq!(
            work.session_path(),
            PathBuf::from("/tmp/run/comparison_session.json")
        );
    }

    #[test]
    fn test_work_area_builder() {
        let work = WorkArea::new("out")
            .with_cleaned_file("final.csv")
            .with_intermediate_file("stage1.csv")
            .with_session_file("s.json");
        assert_eq!(work.cleaned_path(), PathBuf::from("out/final.csv"));
        assert_eq!(work.intermediate_path(), PathBuf::from("out/stage1.csv"));
        assert_eq!(work.session_path(), PathBuf::from("out/s.json"));
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_keywords("LOT1, ,w01"), vec!["LOT1", "w01"]);
        assert_eq!(parse_keywords(" THK "), vec!["THK"]);
        assert!(parse_keywords("").is_empty());
        assert!(parse_keywords(" , ").is_empty());
    }
}
