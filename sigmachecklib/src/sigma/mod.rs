//! Sigma reference data: the measurement-database seam.
//!
//! The library never talks to the database directly. Anything that can
//! turn the five identifiers of a [`SigmaQuery`] into a [`Table`] can act as
//! a [`SigmaSource`]. The query text uses named bind placeholders; values
//! are always bound, never spliced into SQL.
//!
//! [`SnapshotSigmaSource`] serves a CSV snapshot of the query's result set
//! and applies the bindings as equality predicates.

use std::path::{Path, PathBuf};
use std::time::Instant;

use csv::StringRecord;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::data::table::{raw_records, read_text};
use crate::data::{Cell, CsvMode, Table};
use crate::error::SigmaCheckError;
use crate::Result;

/// Sigma measurement query with named bind placeholders.
pub const SIGMA_QUERY: &str = "\
SELECT
    sw.LOT_ID,
    sw.WAFER_ID,
    sw.WAFER_SCRIBE,
    sm.METRIC_TOOL_ID,
    sw.MFG_PROCESS_STEP,
    sw.WAFER_SPEC_ID,
    std.COMMON_TEST_ID,
    sp.TEST_VALUE
FROM SIGMA_POINT sp
INNER JOIN SIGMA_TEST_DEF std ON sp.TEST_DWID = std.TEST_DWID
INNER JOIN SIGMA_WAFER sw ON sp.RUN_COMPLETE_DATETIME = sw.RUN_COMPLETE_DATETIME
INNER JOIN SIGMA_MEASUREMENT sm ON sp.MEASUREMENT_OID = sm.MEASUREMENT_OID
WHERE sw.LOT_ID = :lot_id
  AND sw.WAFER_SCRIBE = :wafer_scribe
  AND sm.METRIC_TOOL_ID = :tool_id
  AND sw.MFG_PROCESS_STEP = :mfg_process_step
  AND sw.WAFER_SPEC_ID = :wafer_spec_id";

/// The five identifiers that select one wafer's Sigma measurements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigmaQuery {
    pub lot_id: String,
    pub wafer_scribe: String,
    pub tool_id: String,
    pub mfg_process_step: String,
    pub wafer_spec_id: String,
}

impl SigmaQuery {
    /// Build a query, trimming whitespace around each identifier.
    pub fn new(
        lot_id: &str,
        wafer_scribe: &str,
        tool_id: &str,
        mfg_process_step: &str,
        wafer_spec_id: &str,
    ) -> Self {
        Self {
            lot_id: lot_id.trim().to_string(),
            wafer_scribe: wafer_scribe.trim().to_string(),
            tool_id: tool_id.trim().to_string(),
            mfg_process_step: mfg_process_step.trim().to_string(),
            wafer_spec_id: wafer_spec_id.trim().to_string(),
        }
    }

    /// A query can only run once every identifier is filled in.
    pub fn is_complete(&self) -> bool {
        self.bindings().iter().all(|(_, value)| !value.is_empty())
    }

    /// Placeholder name and value pairs, in query order.
    pub fn bindings(&self) -> [(&'static str, &str); 5] {
        [
            ("lot_id", self.lot_id.as_str()),
            ("wafer_scribe", self.wafer_scribe.as_str()),
            ("tool_id", self.tool_id.as_str()),
            ("mfg_process_step", self.mfg_process_step.as_str()),
            ("wafer_spec_id", self.wafer_spec_id.as_str()),
        ]
    }
}

/// A producer of Sigma tables keyed by a [`SigmaQuery`].
pub trait SigmaSource {
    /// Check the connection before querying.
    fn ping(&self) -> Result<()>;

    /// Run the query and return its result set.
    fn fetch(&self, query: &SigmaQuery) -> Result<Table>;
}

/// Fetch Sigma data, or an empty table when the query is incomplete.
///
/// The source is pinged first; a failed ping is returned as-is so the
/// caller can report it and retry.
pub fn fetch_sigma(source: &dyn SigmaSource, query: &SigmaQuery) -> Result<Table> {
    if !query.is_complete() {
        warn!("Sigma query is missing identifiers, skipping fetch");
        return Ok(Table::new());
    }

    let started = Instant::now();
    source.ping()?;
    let table = source.fetch(query)?;

    info!(
        lot_id = %query.lot_id,
        wafer_scribe = %query.wafer_scribe,
        rows = table.row_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "fetched Sigma data"
    );
    Ok(table)
}

/// Result-set column each binding is matched against.
const BINDING_COLUMNS: [(&str, &str); 5] = [
    ("lot_id", "LOT_ID"),
    ("wafer_scribe", "WAFER_SCRIBE"),
    ("tool_id", "METRIC_TOOL_ID"),
    ("mfg_process_step", "MFG_PROCESS_STEP"),
    ("wafer_spec_id", "WAFER_SPEC_ID"),
];

/// Serves Sigma data from a CSV export of the query's result set.
#[derive(Debug, Clone)]
pub struct SnapshotSigmaSource {
    path: PathBuf,
}

impl SnapshotSigmaSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Header and unparsed records of the snapshot.
    fn load(&self) -> Result<(Vec<String>, Vec<StringRecord>)> {
        let invalid = |message: String| {
            SigmaCheckError::ConnectionInvalid(format!("{}: {}", self.path.display(), message))
        };
        let text = read_text(&self.path, CsvMode::Lenient).map_err(|e| invalid(e.to_string()))?;
        let (headers, records) = raw_records(&text).map_err(invalid)?;
        if headers.is_empty() {
            return Err(invalid("snapshot has no header".to_string()));
        }
        Ok((headers, records))
    }
}

impl SigmaSource for SnapshotSigmaSource {
    fn ping(&self) -> Result<()> {
        self.load().map(|_| ())
    }

    /// Keep rows whose binding columns hold exactly the bound values.
    ///
    /// Fields are compared as written in the snapshot, like SQL `=` on a
    /// bound string: `007` does not match `7`, and an empty field matches
    /// nothing.
    fn fetch(&self, query: &SigmaQuery) -> Result<Table> {
        let (headers, records) = self.load()?;

        let mut predicates = Vec::new();
        for ((name, value), (_, column)) in query.bindings().into_iter().zip(BINDING_COLUMNS) {
            let index = headers
                .iter()
                .position(|c| c == column)
                .ok_or_else(|| SigmaCheckError::InvalidColumn {
                    table: format!("Sigma snapshot (binding :{})", name),
                    column: column.to_string(),
                })?;
            predicates.push((index, value));
        }

        let rows: Vec<Vec<Cell>> = records
            .iter()
            .filter(|record| {
                predicates.iter().all(|(index, expected)| {
                    record
                        .get(*index)
                        .is_some_and(|field| !field.is_empty() && field == *expected)
                })
            })
            .map(|record| record.iter().map(Cell::parse).collect())
            .collect();

        Ok(Table::from_rows(headers, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SNAPSHOT: &str = "\
LOT_ID,WAFER_ID,WAFER_SCRIBE,METRIC_TOOL_ID,MFG_PROCESS_STEP,WAFER_SPEC_ID,COMMON_TEST_ID,TEST_VALUE
LOT1,1,SCR01,TOOL9,STEP5,SPEC2,THK_P01,100.5
LOT1,1,SCR01,TOOL9,STEP5,SPEC2,THK_P02,101
LOT1,2,SCR02,TOOL9,STEP5,SPEC2,THK_P01,98
LOT2,1,SCR01,TOOL9,STEP5,SPEC2,THK_P01,97
";

    fn query() -> SigmaQuery {
        SigmaQuery::new(" LOT1", "SCR01 ", "TOOL9", "STEP5", "SPEC2")
    }

    #[test]
    fn test_query_trims_and_binds() {
        let q = query();
        assert_eq!(q.lot_id, "LOT1");
        assert_eq!(q.bindings()[1], ("wafer_scribe", "SCR01"));
        assert!(q.is_complete());
        for (name, _) in q.bindings() {
            assert!(SIGMA_QUERY.contains(&format!(":{}", name)));
        }
    }

    #[test]
    fn test_query_text_has_no_literals() {
        assert!(!SIGMA_QUERY.contains('\''));
    }

    #[test]
    fn test_incomplete_query() {
        let q = SigmaQuery::new("LOT1", "  ", "TOOL9", "STEP5", "SPEC2");
        assert!(!q.is_complete());
    }

    #[test]
    fn test_snapshot_fetch_filters_by_bindings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sigma.csv");
        fs::write(&path, SNAPSHOT).unwrap();

        let table = fetch_sigma(&SnapshotSigmaSource::new(&path), &query()).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 8);
    }

    #[test]
    fn test_snapshot_values_are_not_patterns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sigma.csv");
        fs::write(&path, SNAPSHOT).unwrap();

        let injected = SigmaQuery::new("LOT1' OR '1'='1", "SCR01", "TOOL9", "STEP5", "SPEC2");
        let table = SnapshotSigmaSource::new(&path).fetch(&injected).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_snapshot_is_connection_invalid() {
        let source = SnapshotSigmaSource::new("/nonexistent/sigma.csv");
        assert!(matches!(source.ping(), Err(SigmaCheckError::ConnectionInvalid(_))));
        assert!(matches!(
            fetch_sigma(&source, &query()),
            Err(SigmaCheckError::ConnectionInvalid(_))
        ));
    }

    #[test]
    fn test_empty_snapshot_is_connection_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sigma.csv");
        fs::write(&path, "").unwrap();

        let source = SnapshotSigmaSource::new(&path);
        assert!(matches!(source.ping(), Err(SigmaCheckError::ConnectionInvalid(_))));
    }

    #[test]
    fn test_snapshot_missing_binding_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sigma.csv");
        fs::write(&path, "LOT_ID,TEST_VALUE\nLOT1,1\n").unwrap();

        let result = SnapshotSigmaSource::new(&path).fetch(&query());
        assert!(matches!(result, Err(SigmaCheckError::InvalidColumn { .. })));
    }

    #[test]
    fn test_snapshot_bindings_compare_raw_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sigma.csv");
        fs::write(
            &path,
            "LOT_ID,WAFER_SCRIBE,METRIC_TOOL_ID,MFG_PROCESS_STEP,WAFER_SPEC_ID,TEST_VALUE\n\
             LOT1,SCR01,TOOL9,7,,100\n\
             LOT1,SCR01,TOOL9,007,NA,101\n",
        )
        .unwrap();
        let source = SnapshotSigmaSource::new(&path);

        // a missing-value token never matches an empty field
        let na = source.fetch(&SigmaQuery::new("LOT1", "SCR01", "TOOL9", "7", "NA")).unwrap();
        assert!(na.is_empty());

        // leading zeros are part of the identifier
        let padded = source.fetch(&SigmaQuery::new("LOT1", "SCR01", "TOOL9", "007", "NA")).unwrap();
        assert_eq!(padded.row_count(), 1);
        assert_eq!(padded.column("TEST_VALUE").unwrap().cells, vec![Cell::Number(101.0)]);

        let unpadded = source.fetch(&SigmaQuery::new("LOT1", "SCR01", "TOOL9", "7", "SPEC2")).unwrap();
        assert!(unpadded.is_empty());
    }

    #[test]
    fn test_incomplete_query_skips_source() {
        let source = SnapshotSigmaSource::new("/nonexistent/sigma.csv");
        let table = fetch_sigma(&source, &SigmaQuery::default()).unwrap();
        assert_eq!(table.column_count(), 0);
    }
}
