//! Site-by-site comparison of a raw column against a Sigma column.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::{Cell, Column, Table};
use crate::error::SigmaCheckError;
use crate::Result;

/// One aligned position of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// 1-based position, matching wafer site order
    pub site: usize,
    pub sigma: Cell,
    pub raw: Cell,
    pub matched: bool,
}

/// The result of comparing one raw column with one Sigma column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub raw_column: String,
    pub sigma_column: String,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    /// Column headers, carrying the compared column names.
    pub fn headers(&self) -> [String; 4] {
        [
            "Site".to_string(),
            format!("Sigma history data ({})", self.sigma_column),
            format!("Raw data from Tool database ({})", self.raw_column),
            "Matched?".to_string(),
        ]
    }

    pub fn matched_count(&self) -> usize {
        self.rows.iter().filter(|r| r.matched).count()
    }

    pub fn mismatched_count(&self) -> usize {
        self.rows.len() - self.matched_count()
    }

    /// Render as a four-column table; `Matched?` reads `Yes` or `No`.
    pub fn to_table(&self) -> Table {
        let [site, sigma, raw, matched] = self.headers();
        Table::from_columns(vec![
            Column::new(
                site,
                self.rows.iter().map(|r| Cell::Number(r.site as f64)).collect(),
            ),
            Column::new(sigma, self.rows.iter().map(|r| r.sigma.clone()).collect()),
            Column::new(raw, self.rows.iter().map(|r| r.raw.clone()).collect()),
            Column::new(
                matched,
                self.rows
                    .iter()
                    .map(|r| Cell::text(if r.matched { "Yes" } else { "No" }))
                    .collect(),
            ),
        ])
    }
}

fn require_column<'a>(table: &'a Table, name: &str, label: &str) -> Result<&'a Column> {
    table.column(name).ok_or_else(|| SigmaCheckError::InvalidColumn {
        table: label.to_string(),
        column: name.to_string(),
    })
}

/// Check that both columns exist before anything is compared.
pub fn validate_columns(raw: &Table, raw_column: &str, sigma: &Table, sigma_column: &str) -> Result<()> {
    require_column(raw, raw_column, "raw")?;
    require_column(sigma, sigma_column, "Sigma")?;
    Ok(())
}

/// Align `raw_column` of `raw` with `sigma_column` of `sigma` by position.
///
/// The shorter column is padded with [`Cell::Missing`] up to the longer
/// one, so the output has one row per position of the longer column.
/// Values are compared with [`Cell::matches`]: a padded position never
/// matches a real value, while two missing cells at the same site count as
/// matched.
pub fn compare_columns(
    raw: &Table,
    raw_column: &str,
    sigma: &Table,
    sigma_column: &str,
) -> Result<ComparisonTable> {
    let raw_cells = &require_column(raw, raw_column, "raw")?.cells;
    let sigma_cells = &require_column(sigma, sigma_column, "Sigma")?.cells;

    let sites = raw_cells.len().max(sigma_cells.len());
    let rows: Vec<ComparisonRow> = (0..sites)
        .map(|i| {
            let raw = raw_cells.get(i).cloned().unwrap_or(Cell::Missing);
            let sigma = sigma_cells.get(i).cloned().unwrap_or(Cell::Missing);
            ComparisonRow {
                site: i + 1,
                matched: raw.matches(&sigma),
                sigma,
                raw,
            }
        })
        .collect();

    let comparison = ComparisonTable {
        raw_column: raw_column.to_string(),
        sigma_column: sigma_column.to_string(),
        rows,
    };

    info!(
        raw_column,
        sigma_column,
        sites,
        matched = comparison.matched_count(),
        "compared columns"
    );
    Ok(comparison)
}
