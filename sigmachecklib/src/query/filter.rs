//! Keyword filters that narrow a table by column names or row contents.
//!
//! Both filters apply keywords one at a time: each keyword only looks at
//! what survived the keywords before it. Matching is a case-insensitive
//! substring test. Neither filter can fail; a keyword that matches nothing
//! simply leaves an empty table.

use crate::data::Table;

/// Keep only columns whose name contains every keyword.
///
/// Once a keyword eliminates every column the result has no columns.
pub fn filter_columns<S: AsRef<str>>(table: &Table, keywords: &[S]) -> Table {
    let mut surviving: Vec<usize> = (0..table.column_count()).collect();

    for keyword in keywords {
        let needle = keyword.as_ref().to_lowercase();
        surviving.retain(|&i| table.columns()[i].name.to_lowercase().contains(&needle));
    }

    table.select_columns(&surviving)
}

/// Keep only rows where, for every keyword, some cell contains it.
///
/// Cells are matched on their display form, so numbers match by their
/// printed digits and missing cells match nothing but the empty keyword.
/// All columns are kept, even when no rows survive.
pub fn filter_rows<S: AsRef<str>>(table: &Table, keywords: &[S]) -> Table {
    let mut surviving: Vec<usize> = (0..table.row_count()).collect();

    for keyword in keywords {
        let needle = keyword.as_ref().to_lowercase();
        surviving.retain(|&i| {
            table
                .columns()
                .iter()
                .any(|column| column.cells[i].as_display().to_lowercase().contains(&needle))
        });
    }

    table.select_rows(&surviving)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;

    fn sigma_table() -> Table {
        Table::parse_csv_str(
            "LOT_ID,WAFER_SCRIBE,COMMON_TEST_ID,TEST_VALUE\n\
             LOT1,W01,THK_P01,100.5\n\
             LOT1,W01,THK_P02,101.25\n\
             LOT1,W01,RI_P01,1.46\n\
             LOT1,W02,THK_P01,99\n",
        )
        .unwrap()
    }

    fn raw_table() -> Table {
        Table::parse_csv_str(
            "Site,THK_Mean_P01,THK_Max_P01,RI_Mean_P01,Notes\n1,100.5,101,1.46,ok\n",
        )
        .unwrap()
    }

    #[test]
    fn test_filter_columns_single_keyword() {
        let filtered = filter_columns(&raw_table(), &["thk"]);
        assert_eq!(filtered.column_names(), vec!["THK_Mean_P01", "THK_Max_P01"]);
        assert_eq!(filtered.row_count(), 1);
    }

    #[test]
    fn test_filter_columns_sequential_and() {
        let filtered = filter_columns(&raw_table(), &["mean", "p01"]);
        assert_eq!(filtered.column_names(), vec!["THK_Mean_P01", "RI_Mean_P01"]);
    }

    #[test]
    fn test_filter_columns_no_match_is_empty() {
        let filtered = filter_columns(&raw_table(), &["THK", "zzz"]);
        assert_eq!(filtered.column_count(), 0);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_filter_columns_no_keywords_is_identity() {
        let keywords: [&str; 0] = [];
        assert_eq!(filter_columns(&raw_table(), &keywords), raw_table());
    }

    #[test]
    fn test_filter_rows_single_keyword() {
        let filtered = filter_rows(&sigma_table(), &["thk"]);
        assert_eq!(filtered.row_count(), 3);
        assert_eq!(filtered.column_count(), 4);
    }

    #[test]
    fn test_filter_rows_sequential_and() {
        let filtered = filter_rows(&sigma_table(), &["thk", "w01"]);
        assert_eq!(
            filtered.column("COMMON_TEST_ID").unwrap().cells,
            vec![Cell::text("THK_P01"), Cell::text("THK_P02")]
        );
    }

    #[test]
    fn test_filter_rows_matches_numbers_by_display() {
        let filtered = filter_rows(&sigma_table(), &["101.2"]);
        assert_eq!(filtered.row_count(), 1);
    }

    #[test]
    fn test_filter_rows_no_match_keeps_columns() {
        let filtered = filter_rows(&sigma_table(), &["nothing"]);
        assert_eq!(filtered.row_count(), 0);
        assert_eq!(filtered.column_names(), sigma_table().column_names());
    }

    #[test]
    fn test_filters_do_not_touch_input() {
        let table = sigma_table();
        let _ = filter_rows(&table, &["RI"]);
        let _ = filter_columns(&table, &["LOT"]);
        assert_eq!(table, sigma_table());
    }

    #[test]
    fn test_filters_compose() {
        let table = sigma_table();
        assert_eq!(
            filter_rows(&table, &["lot1", "p01"]),
            filter_rows(&filter_rows(&table, &["lot1"]), &["p01"])
        );

        let raw = raw_table();
        assert_eq!(
            filter_columns(&raw, &["p01", "max"]),
            filter_columns(&filter_columns(&raw, &["p01"]), &["max"])
        );
    }

    #[test]
    fn test_filters_never_grow() {
        let table = sigma_table();
        let keywords = ["lot", "w0", "thk", "p01"];
        let mut previous = table.row_count();
        for n in 1..=keywords.len() {
            let count = filter_rows(&table, &keywords[..n]).row_count();
            assert!(count <= previous);
            previous = count;
        }
    }
}
