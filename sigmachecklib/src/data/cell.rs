//! Cell values held in a [`Table`](super::Table).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens read as a missing value when parsing delimited text.
const MISSING_TOKENS: &[&str] = &["", "NaN", "nan", "NA", "N/A", "#N/A", "null", "NULL"];

/// A single table value.
///
/// Exports mix numbers and free text in the same column, so every cell keeps
/// its own tag instead of the column carrying a type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Free text
    Text(String),
    /// A finite number
    Number(f64),
    /// No value (empty field, NA token, or padding)
    #[default]
    Missing,
}

impl Cell {
    /// Read a raw delimited field.
    ///
    /// Empty fields and the usual NA tokens become [`Cell::Missing`], fields
    /// that parse as a finite `f64` (surrounding whitespace allowed) become
    /// [`Cell::Number`], and everything else is kept verbatim as [`Cell::Text`].
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if MISSING_TOKENS.contains(&trimmed) {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Text(raw.to_string()),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Comparison equality used when aligning Sigma and raw columns.
    ///
    /// Numbers compare numerically, text compares exactly, and a number never
    /// equals text. Two missing cells are equal; a missing cell never equals
    /// a present one.
    pub fn matches(&self, other: &Cell) -> bool {
        match (self, other) {
            (Cell::Missing, Cell::Missing) => true,
            (Cell::Number(a), Cell::Number(b)) => a == b,
            (Cell::Text(a), Cell::Text(b)) => a == b,
            _ => false,
        }
    }

    /// String form used by keyword filters and CSV output.
    pub fn as_display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() keeps width/alignment from the caller's format spec
        match self {
            Cell::Text(s) => f.pad(s),
            Cell::Number(v) => f.pad(&v.to_string()),
            Cell::Missing => f.pad(""),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbers() {
        assert_eq!(Cell::parse("1.5"), Cell::Number(1.5));
        assert_eq!(Cell::parse(" 42 "), Cell::Number(42.0));
        assert_eq!(Cell::parse("-3e2"), Cell::Number(-300.0));
    }

    #[test]
    fn test_parse_missing_tokens() {
        assert_eq!(Cell::parse(""), Cell::Missing);
        assert_eq!(Cell::parse("   "), Cell::Missing);
        assert_eq!(Cell::parse("NaN"), Cell::Missing);
        assert_eq!(Cell::parse("N/A"), Cell::Missing);
    }

    #[test]
    fn test_parse_text_kept_verbatim() {
        assert_eq!(Cell::parse("P01 "), Cell::Text("P01 ".to_string()));
        assert_eq!(Cell::parse("inf"), Cell::Text("inf".to_string()));
    }

    #[test]
    fn test_matches_policy() {
        assert!(Cell::Missing.matches(&Cell::Missing));
        assert!(!Cell::Missing.matches(&Cell::Number(0.0)));
        assert!(!Cell::text("1").matches(&Cell::Number(1.0)));
        assert!(Cell::Number(1.0).matches(&Cell::parse("1.000")));
        assert!(Cell::text("ok").matches(&Cell::text("ok")));
    }

    #[test]
    fn test_display() {
        assert_eq!(Cell::Number(3.0).to_string(), "3");
        assert_eq!(Cell::Number(0.25).to_string(), "0.25");
        assert_eq!(Cell::Missing.to_string(), "");
        assert_eq!(format!("{:>5}", Cell::text("ab")), "   ab");
        assert_eq!(format!("{:<4}|", Cell::Number(7.0)), "7   |");
    }
}
