//! Rectangular tables of named columns.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use crate::error::SigmaCheckError;
use crate::Result;

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// How tolerant the delimited-text parser is of ragged rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvMode {
    /// A row wider than the header is a parse failure
    Strict,
    /// Wide rows grow the header with `Unnamed: N` columns
    Lenient,
}

/// An ordered set of equally long, uniquely named columns.
///
/// Tables are never edited in place once built: filters and comparisons
/// always hand back a new table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Create a table with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a header and row-major data.
    ///
    /// Header names are made unique, short rows are padded with
    /// [`Cell::Missing`] and wide rows add `Unnamed: N` columns.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(headers.len());
        let mut headers = headers;
        while headers.len() < width {
            headers.push(String::new());
        }

        let mut columns: Vec<Column> = unique_headers(headers)
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.cells.push(cells.next().unwrap_or(Cell::Missing));
            }
        }

        Self { columns }
    }

    /// Build a table from columns, padding short columns with [`Cell::Missing`].
    pub fn from_columns(columns: Vec<Column>) -> Self {
        let height = columns.iter().map(Column::len).max().unwrap_or(0);
        let names = unique_headers(columns.iter().map(|c| c.name.clone()).collect());
        let columns = columns
            .into_iter()
            .zip(names)
            .map(|(mut column, name)| {
                column.name = name;
                column.cells.resize(height, Cell::Missing);
                column
            })
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// True when the table has no rows (or no columns at all).
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Cells of row `index`, left to right.
    pub fn row(&self, index: usize) -> Vec<&Cell> {
        self.columns.iter().map(|c| &c.cells[index]).collect()
    }

    /// Iterate over every row.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Cell>> + '_ {
        (0..self.row_count()).map(move |i| self.row(i))
    }

    /// New table holding only the columns at `indices`, in that order.
    pub fn select_columns(&self, indices: &[usize]) -> Table {
        Table {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
        }
    }

    /// New table holding only the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), indices.iter().map(|&i| c.cells[i].clone()).collect()))
                .collect(),
        }
    }

    /// Parse delimited text with a header row, rejecting ragged wide rows.
    pub fn parse_csv_str(text: &str) -> Result<Table> {
        Self::parse_csv_text(text, CsvMode::Strict, Path::new("<memory>"))
    }

    /// Parse delimited text that came from `origin` (used in error messages).
    pub fn parse_csv_text(text: &str, mode: CsvMode, origin: &Path) -> Result<Table> {
        parse_delimited(text, mode).map_err(|message| SigmaCheckError::ParseFailure {
            path: origin.to_path_buf(),
            message,
        })
    }

    /// Read a delimited file with a header row.
    ///
    /// In [`CsvMode::Lenient`] invalid UTF-8 is replaced rather than rejected,
    /// so the only failure left is a missing or unreadable file.
    pub fn read_csv(path: impl AsRef<Path>, mode: CsvMode) -> Result<Table> {
        let path = path.as_ref();
        let text = read_text(path, mode)?;
        Self::parse_csv_text(&text, mode, path)
    }

    /// Write the table as comma-delimited text with a header row.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)?;
        self.write_records(&mut writer)?;
        writer.flush().map_err(|e| SigmaCheckError::from_io(path, e))?;
        Ok(())
    }

    /// Render the table as comma-delimited text with a header row.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        self.write_records(&mut writer)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| SigmaCheckError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn write_records<W: std::io::Write>(&self, writer: &mut csv::Writer<W>) -> Result<()> {
        if self.columns.is_empty() {
            return Ok(());
        }
        writer.write_record(self.column_names())?;
        for row in self.rows() {
            writer.write_record(row.iter().map(|c| c.as_display()))?;
        }
        Ok(())
    }
}

/// Make header names unique the way spreadsheet tools do.
///
/// Blank names become `Unnamed: <index>` and repeats get `.1`, `.2`, ...
pub fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(headers.len());
    for (index, header) in headers.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {}", index)
        } else {
            header
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        seen.push(candidate);
    }
    seen
}

fn is_blank_line(record: &csv::StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(|field| field.trim().is_empty())
}

/// Load a file as text, replacing invalid UTF-8 in lenient mode.
pub(crate) fn read_text(path: &Path, mode: CsvMode) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| SigmaCheckError::from_io(path, e))?;
    match mode {
        CsvMode::Lenient => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        CsvMode::Strict => String::from_utf8(bytes).map_err(|e| SigmaCheckError::ParseFailure {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

/// Split delimited text into its header fields and unparsed data records.
pub(crate) fn raw_records(
    text: &str,
) -> std::result::Result<(Vec<String>, Vec<csv::StringRecord>), String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    // Blank lines carry no data in any supported dialect. They are dropped as
    // records so that quoted fields spanning blank lines stay intact.
    let mut records = reader.records().filter(|record| match record {
        Ok(r) => !is_blank_line(r),
        Err(_) => true,
    });

    let headers: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(|e| e.to_string())?
            .iter()
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };
    let rows = records
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    Ok((headers, rows))
}

fn parse_delimited(text: &str, mode: CsvMode) -> std::result::Result<Table, String> {
    let (headers, records) = raw_records(text)?;

    let mut rows = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        if mode == CsvMode::Strict && record.len() > headers.len() {
            return Err(format!(
                "expected {} fields, saw {} in data row {}",
                headers.len(),
                record.len(),
                index + 1
            ));
        }
        rows.push(record.iter().map(Cell::parse).collect());
    }

    Ok(Table::from_rows(headers, rows))
}
