//! Removal of instrument header blocks.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::SigmaCheckError;
use crate::Result;

/// Line that closes an instrument header block.
pub const HEADER_SENTINEL: &str = "End Header Data";

/// Drops everything up to and including the `End Header Data` line.
///
/// Files without the sentinel pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderBlockStripper;

impl HeaderBlockStripper {
    pub fn new() -> Self {
        Self
    }

    /// Return the bytes after the sentinel line, and whether it was found.
    ///
    /// The sentinel must fill its line exactly; the `\n` or `\r\n` ending is
    /// not part of the comparison. Kept lines are returned byte-for-byte.
    pub fn strip_bytes<'a>(&self, content: &'a [u8]) -> (&'a [u8], bool) {
        let mut offset = 0;
        for line in content.split_inclusive(|&b| b == b'\n') {
            offset += line.len();
            let body = line.strip_suffix(b"\n").unwrap_or(line);
            let body = body.strip_suffix(b"\r").unwrap_or(body);
            if body == HEADER_SENTINEL.as_bytes() {
                return (&content[offset..], true);
            }
        }
        (content, false)
    }

    /// Strip `input` into `output`, returning whether a header block was removed.
    pub fn strip(&self, input: &Path, output: &Path) -> Result<bool> {
        let content = fs::read(input).map_err(|e| SigmaCheckError::from_io(input, e))?;
        let (remaining, found) = self.strip_bytes(&content);
        fs::write(output, remaining).map_err(|e| SigmaCheckError::from_io(output, e))?;

        if found {
            info!(
                input = %input.display(),
                output = %output.display(),
                removed_bytes = content.len() - remaining.len(),
                "stripped header block"
            );
        } else {
            debug!(input = %input.display(), "no header block found");
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_keeps_lines_after_sentinel() {
        let input = b"Tool: T1\nRecipe: R\nEnd Header Data\nSite,THK\n1,100\n";
        let (rest, found) = HeaderBlockStripper::new().strip_bytes(input);

        assert!(found);
        assert_eq!(rest, b"Site,THK\n1,100\n");
    }

    #[test]
    fn test_output_equals_lines_after_sentinel() {
        let lines = ["a", "b", "End Header Data", "c", "d"];
        let text = lines.join("\n") + "\n";
        let (rest, _) = HeaderBlockStripper::new().strip_bytes(text.as_bytes());

        let expected = lines[3..].join("\n") + "\n";
        assert_eq!(rest, expected.as_bytes());
    }

    #[test]
    fn test_passthrough_without_sentinel() {
        let input = b"Site,THK\r\n1,100\r\nEnd Header Data here\r\n";
        let (rest, found) = HeaderBlockStripper::new().strip_bytes(input);

        assert!(!found);
        assert_eq!(rest, input);
    }

    #[test]
    fn test_crlf_sentinel_and_first_occurrence() {
        let input = b"h\r\nEnd Header Data\r\nx\r\nEnd Header Data\r\ny\r\n";
        let (rest, found) = HeaderBlockStripper::new().strip_bytes(input);

        assert!(found);
        assert_eq!(rest, b"x\r\nEnd Header Data\r\ny\r\n");
    }

    #[test]
    fn test_sentinel_on_last_line() {
        let (rest, found) = HeaderBlockStripper::new().strip_bytes(b"h\nEnd Header Data");
        assert!(found);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_strip_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        fs::write(&input, "meta\nEnd Header Data\nA,B\n1,2\n").unwrap();

        let found = HeaderBlockStripper::new().strip(&input, &output).unwrap();

        assert!(found);
        assert_eq!(fs::read_to_string(&output).unwrap(), "A,B\n1,2\n");
    }

    #[test]
    fn test_strip_missing_input() {
        let dir = tempdir().unwrap();
        let result = HeaderBlockStripper::new()
            .strip(&dir.path().join("none.csv"), &dir.path().join("out.csv"));

        assert!(matches!(result, Err(SigmaCheckError::FileNotFound(_))));
        assert!(!dir.path().join("out.csv").exists());
    }
}
