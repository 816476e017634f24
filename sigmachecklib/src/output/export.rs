//! Spreadsheet and CSV export of accumulated comparisons.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::data::{Cell, Table};
use crate::error::SigmaCheckError;
use crate::Result;

/// Name of the single worksheet in an exported workbook.
pub const EXPORT_SHEET_NAME: &str = "Data Comparison";

/// Suffix every header with its position: `["Site", "Site"]` becomes
/// `["Site_0", "Site_1"]`.
pub fn dedupe_headers<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| format!("{}_{}", name, i))
        .collect()
}

/// Write `table` to an `.xlsx` workbook with one sheet.
///
/// Numbers are written as numeric cells, missing cells are left blank.
pub fn export_xlsx(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    for (col, column) in table.columns().iter().enumerate() {
        let col = u16::try_from(col)
            .map_err(|_| SigmaCheckError::Export(format!("too many columns: {}", table.column_count())))?;
        worksheet.write_string_with_format(0, col, &column.name, &header_format)?;

        for (row, cell) in column.cells.iter().enumerate() {
            let row = u32::try_from(row + 1)
                .map_err(|_| SigmaCheckError::Export(format!("too many rows: {}", table.row_count())))?;
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string(row, col, s)?;
                }
                Cell::Number(v) => {
                    worksheet.write_number(row, col, *v)?;
                }
                Cell::Missing => {}
            }
        }
    }

    workbook.save(path)?;
    info!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "exported workbook"
    );
    Ok(())
}

/// Write `table` as comma-delimited text.
pub fn export_csv(table: &Table, path: &Path) -> Result<()> {
    table.write_csv(path)?;
    info!(path = %path.display(), rows = table.row_count(), "exported CSV");
    Ok(())
}
