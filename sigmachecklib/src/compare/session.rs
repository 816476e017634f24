//! Accumulation of comparisons across compare actions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::comparator::{compare_columns, validate_columns, ComparisonTable};
use crate::data::{Column, Table};
use crate::error::SigmaCheckError;
use crate::output::dedupe_headers;
use crate::Result;

/// Comparisons collected side by side until explicitly reset.
///
/// Owned by the workflow shell and passed into each compare step. The CLI
/// persists it as JSON between invocations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSession {
    comparisons: Vec<ComparisonTable>,
}

impl ComparisonSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, comparison: ComparisonTable) {
        self.comparisons.push(comparison);
    }

    pub fn reset(&mut self) {
        self.comparisons.clear();
    }

    pub fn comparisons(&self) -> &[ComparisonTable] {
        &self.comparisons
    }

    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    /// Compare two columns and append the result.
    ///
    /// Both columns are checked first; on error the session is unchanged.
    pub fn compare_and_append(
        &mut self,
        raw: &Table,
        raw_column: &str,
        sigma: &Table,
        sigma_column: &str,
    ) -> Result<&ComparisonTable> {
        validate_columns(raw, raw_column, sigma, sigma_column)?;
        let comparison = compare_columns(raw, raw_column, sigma, sigma_column)?;
        self.comparisons.push(comparison);
        Ok(&self.comparisons[self.comparisons.len() - 1])
    }

    /// Concatenate every comparison column-wise into one table.
    ///
    /// Headers get their position as a suffix (`Site_0`, ..., `Site_4`) so
    /// repeated comparisons never collide. Shorter comparisons are padded
    /// with missing cells.
    pub fn to_table(&self) -> Table {
        let columns: Vec<Column> = self
            .comparisons
            .iter()
            .flat_map(|c| c.to_table().columns().to_vec())
            .collect();

        let names = dedupe_headers(columns.iter().map(|c| c.name.as_str()));
        Table::from_columns(
            columns
                .into_iter()
                .zip(names)
                .map(|(column, name)| Column::new(name, column.cells))
                .collect(),
        )
    }

    /// Load a saved session; a missing file is a fresh session.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no saved session, starting fresh");
            return Ok(Self::new());
        }
        let text = fs::read_to_string(path).map_err(|e| SigmaCheckError::from_io(path, e))?;
        let session: Self = serde_json::from_str(&text).map_err(|e| SigmaCheckError::Session {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), comparisons = session.len(), "loaded session");
        Ok(session)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(|e| SigmaCheckError::Session {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, text).map_err(|e| SigmaCheckError::from_io(path, e))?;
        info!(path = %path.display(), comparisons = self.len(), "saved session");
        Ok(())
    }
}
