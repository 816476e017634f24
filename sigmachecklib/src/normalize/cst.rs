//! Cleaner for whitespace-separated CST instrument logs.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::SigmaCheckError;
use crate::Result;

/// Turns a CST log into comma-delimited rows.
///
/// Lines starting with `#` are comments. Every other line is split on runs
/// of whitespace; lines with no fields at all are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedWidthLogCleaner;

impl FixedWidthLogCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Tokenize CST text into rows of fields.
    pub fn clean_text(&self, text: &str) -> Vec<Vec<String>> {
        text.lines()
            .filter(|line| !line.starts_with('#'))
            .map(|line| line.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|fields| !fields.is_empty())
            .collect()
    }

    /// Clean `input` and write the rows to `output`.
    ///
    /// Rows may differ in length; they are written as-is.
    pub fn clean(&self, input: &Path, output: &Path) -> Result<Vec<Vec<String>>> {
        let text = fs::read_to_string(input).map_err(|e| SigmaCheckError::from_io(input, e))?;
        let rows = self.clean_text(&text);

        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(output)?;
        for row in &rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(|e| SigmaCheckError::from_io(output, e))?;

        info!(
            input = %input.display(),
            output = %output.display(),
            rows = rows.len(),
            "cleaned CST log"
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_comment_lines_dropped() {
        let rows = FixedWidthLogCleaner::new().clean_text("# comment\n1 2 3\n4 5 6\n");
        assert_eq!(rows, vec![vec!["1", "2", "3"], vec!["4", "5", "6"]]);
    }

    #[test]
    fn test_runs_of_whitespace_split_once() {
        let rows = FixedWidthLogCleaner::new().clean_text("  Site\t X    Y\n1   -0.5\t\t2.25\n");
        assert_eq!(rows, vec![vec!["Site", "X", "Y"], vec!["1", "-0.5", "2.25"]]);
    }

    #[test]
    fn test_blank_lines_and_indented_hash() {
        // only a leading '#' marks a comment
        let rows = FixedWidthLogCleaner::new().clean_text("\n   \n #tag 1\n");
        assert_eq!(rows, vec![vec!["#tag", "1"]]);
    }

    #[test]
    fn test_clean_writes_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("W01.CST");
        let output = dir.path().join("cleaned_data.csv");
        fs::write(&input, "# header\n# more\nSite THK\n1 100.5\n2 101\n").unwrap();

        let rows = FixedWidthLogCleaner::new().clean(&input, &output).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "Site,THK\n1,100.5\n2,101\n"
        );
    }

    #[test]
    fn test_clean_ragged_rows() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("W01.CST");
        let output = dir.path().join("out.csv");
        fs::write(&input, "a b c\nd\n").unwrap();

        FixedWidthLogCleaner::new().clean(&input, &output).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "a,b,c\nd\n");
    }

    #[test]
    fn test_clean_missing_input() {
        let dir = tempdir().unwrap();
        let result = FixedWidthLogCleaner::new()
            .clean(&dir.path().join("absent.CST"), &dir.path().join("out.csv"));

        assert!(matches!(result, Err(SigmaCheckError::FileNotFound(_))));
    }
}
