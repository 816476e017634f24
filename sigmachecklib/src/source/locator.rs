//! Export file discovery by filename keywords.
//!
//! This module walks a directory tree and returns every data file whose
//! name contains all of the requested keywords.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extensions reserved for tool reports and metadata, never data.
pub const REPORT_EXTENSIONS: &[&str] = &[".RPT", ".mcd"];

/// Configuration for file search.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Keywords that must all appear in the file name (case-insensitive)
    pub keywords: Vec<String>,
    /// Filename suffixes that are always skipped (case-sensitive)
    pub excluded_suffixes: Vec<String>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            excluded_suffixes: REPORT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LocatorConfig {
    /// Create a config that matches every non-report file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required keyword.
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    /// Add multiple required keywords.
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    /// Add an excluded filename suffix.
    pub fn exclude_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.excluded_suffixes.push(suffix.into());
        self
    }

    /// Check if a file name passes the search criteria.
    ///
    /// A name matches if:
    /// 1. It doesn't end with an excluded suffix
    /// 2. Every keyword is a case-insensitive substring of it
    pub fn matches(&self, file_name: &str) -> bool {
        if self
            .excluded_suffixes
            .iter()
            .any(|suffix| file_name.ends_with(suffix.as_str()))
        {
            return false;
        }

        let lowered = file_name.to_lowercase();
        self.keywords
            .iter()
            .all(|keyword| lowered.contains(&keyword.to_lowercase()))
    }
}

/// Search a directory tree for data files matching the config.
///
/// Entries within a directory are visited in file-name order, so the result
/// is stable for a given tree. A missing root, an empty tree, or zero
/// matches all produce an empty list.
pub fn search_files(root: impl AsRef<Path>, config: &LocatorConfig) -> Vec<PathBuf> {
    let root = root.as_ref();
    let started = Instant::now();

    if !root.exists() {
        warn!(root = %root.display(), "search root does not exist");
        return Vec::new();
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        // Linked files are listed, linked directories are not descended
        let file_type = entry.file_type();
        if !(file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())) {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if config.matches(&name) {
            files.push(entry.path().to_path_buf());
        }
    }

    info!(
        root = %root.display(),
        matches = files.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "file search finished"
    );

    files
}
