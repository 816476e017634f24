//! Error types for sigmachecklib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating, cleaning, or comparing data
#[derive(Error, Debug)]
pub enum SigmaCheckError {
    /// Input path does not exist
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A cleaning stage produced content that cannot be parsed as a table
    #[error("failed to parse '{path}': {message}")]
    ParseFailure { path: PathBuf, message: String },

    /// A requested column does not exist in a table
    #[error("column '{column}' not found in {table} data")]
    InvalidColumn { table: String, column: String },

    /// The measurement database handshake failed
    #[error("connection is not valid: {0}")]
    ConnectionInvalid(String),

    /// Spreadsheet export failed
    #[error("export failed: {0}")]
    Export(String),

    /// Session state could not be loaded or saved
    #[error("session file '{path}' is unusable: {message}")]
    Session { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader/writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SigmaCheckError {
    /// Map an IO error on `path`, turning `NotFound` into [`SigmaCheckError::FileNotFound`].
    pub(crate) fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            SigmaCheckError::FileNotFound(path)
        } else {
            SigmaCheckError::FileRead { path, source: err }
        }
    }

    /// Whether this error is the non-fatal "missing input" kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SigmaCheckError::FileNotFound(_))
    }
}

impl From<rust_xlsxwriter::XlsxError> for SigmaCheckError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        SigmaCheckError::Export(err.to_string())
    }
}
