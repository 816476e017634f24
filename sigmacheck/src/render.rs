//! Rendering of tables and file lists for the terminal.

use std::path::PathBuf;
use std::str::FromStr;

use console::Style;
use serde::Serialize;
use sigmachecklib::{Cell, Table};

/// Widest a table column is allowed to get in table mode
const MAX_CELL_WIDTH: usize = 40;

/// How results are printed to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Aligned text table
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Comma-delimited text
    Csv,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(OutputMode::Table),
            "json" => Ok(OutputMode::Json),
            "csv" => Ok(OutputMode::Csv),
            _ => Err(format!("Unknown output mode: {}", s)),
        }
    }
}

/// JSON shape of a rendered table
#[derive(Debug, Serialize)]
struct TableView {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    headers: Vec<String>,
    rows: Vec<Vec<serde_json::Value>>,
}

fn cell_json(cell: &Cell) -> serde_json::Value {
    match cell {
        Cell::Text(s) => serde_json::Value::String(s.clone()),
        Cell::Number(v) => serde_json::json!(v),
        Cell::Missing => serde_json::Value::Null,
    }
}

/// Truncate to `max_len` characters, adding a ".." prefix if needed
fn truncate(value: &str, max_len: usize) -> String {
    let len = value.chars().count();
    if len > max_len {
        let tail: String = value.chars().skip(len - max_len + 2).collect();
        format!("..{}", tail)
    } else {
        value.to_string()
    }
}

/// Render a table in the requested mode.
pub fn render_table(
    table: &Table,
    title: Option<&str>,
    mode: OutputMode,
) -> Result<String, anyhow::Error> {
    match mode {
        OutputMode::Json => {
            let view = TableView {
                title: title.map(str::to_string),
                headers: table.column_names().iter().map(|s| s.to_string()).collect(),
                rows: table
                    .rows()
                    .map(|row| row.into_iter().map(cell_json).collect())
                    .collect(),
            };
            Ok(serde_json::to_string_pretty(&view)? + "\n")
        }
        OutputMode::Csv => Ok(table.to_csv_string()?),
        OutputMode::Table => Ok(render_text_table(table, title)),
    }
}

fn render_text_table(table: &Table, title: Option<&str>) -> String {
    let bold = Style::new().bold();
    let mut out = String::new();

    if let Some(title) = title {
        out.push_str(&format!("{}\n", bold.apply_to(title)));
    }

    if table.column_count() == 0 {
        out.push_str("(no columns)\n");
        return out;
    }

    let headers: Vec<String> = table
        .column_names()
        .iter()
        .map(|h| truncate(h, MAX_CELL_WIDTH))
        .collect();
    let rows: Vec<Vec<String>> = table
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| truncate(&cell.as_display(), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<width$}", h, width = w))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(&format!("{}\n", bold.apply_to(header_line.trim_end())));

    let separator_width = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    out.push_str(&"-".repeat(separator_width));
    out.push('\n');

    for row in &rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = w))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push_str(&format!("({} rows)\n", table.row_count()));
    out
}

/// Render a list of matching files.
pub fn render_paths(paths: &[PathBuf], mode: OutputMode) -> Result<String, anyhow::Error> {
    match mode {
        OutputMode::Json => {
            let list: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            Ok(serde_json::to_string_pretty(&list)? + "\n")
        }
        OutputMode::Csv => {
            let mut out = String::from("path\n");
            for path in paths {
                out.push_str(&format!("{}\n", path.display()));
            }
            Ok(out)
        }
        OutputMode::Table => {
            let mut out = String::new();
            for path in paths {
                out.push_str(&format!("{}\n", path.display()));
            }
            out.push_str(&format!("({} matching files)\n", paths.len()));
            Ok(out)
        }
    }
}
