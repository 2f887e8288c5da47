use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::table::{Row, Table};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub duplicate_rows: usize,
    pub incomplete_rows: usize,
    pub output_rows: usize,
}

/// Keeps the first occurrence of every distinct row, preserving order.
pub fn deduplicate(table: &Table) -> Table {
    let mut seen: HashSet<&Row> = HashSet::with_capacity(table.len());
    let rows = table
        .rows()
        .iter()
        .filter(|row| seen.insert(*row))
        .cloned()
        .collect();
    table.with_rows(rows)
}

/// Drops every row holding at least one null cell.
pub fn drop_incomplete(table: &Table) -> Table {
    let rows = table
        .rows()
        .iter()
        .filter(|row| !row.iter().any(|value| value.is_null()))
        .cloned()
        .collect();
    table.with_rows(rows)
}

pub fn clean(table: &Table) -> Table {
    clean_with_report(table).0
}

pub fn clean_with_report(table: &Table) -> (Table, CleaningReport) {
    let deduplicated = deduplicate(table);
    let cleaned = drop_incomplete(&deduplicated);
    let report = CleaningReport {
        input_rows: table.len(),
        duplicate_rows: table.len() - deduplicated.len(),
        incomplete_rows: deduplicated.len() - cleaned.len(),
        output_rows: cleaned.len(),
    };
    (cleaned, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::new(columns.iter().map(|name| name.to_string()).collect(), rows)
            .expect("test table should be rectangular")
    }

    fn sample() -> Table {
        table(
            &["station", "temp", "humidity"],
            vec![
                vec![Value::text("A"), Value::from(12.5), Value::from(80)],
                vec![Value::text("B"), Value::Null, Value::from(75)],
                vec![Value::text("A"), Value::from(12.5), Value::from(80)],
                vec![Value::text("C"), Value::from(9), Value::from(90)],
                vec![Value::text("B"), Value::Null, Value::from(75)],
                vec![Value::text("C"), Value::from(9), Value::text("90")],
            ],
        )
    }

    #[test]
    fn deduplicate_keeps_first_occurrence_in_order() {
        let deduplicated = deduplicate(&sample());

        assert_eq!(deduplicated.len(), 4);
        assert_eq!(deduplicated.rows()[0][0], Value::text("A"));
        assert_eq!(deduplicated.rows()[1][0], Value::text("B"));
        assert_eq!(deduplicated.rows()[2][2], Value::from(90));
        // Same digits, different cell type: both survive.
        assert_eq!(deduplicated.rows()[3][2], Value::text("90"));
    }

    #[test]
    fn drop_incomplete_removes_rows_with_any_null() {
        let complete = drop_incomplete(&sample());

        assert_eq!(complete.len(), 4);
        assert!(complete
            .rows()
            .iter()
            .all(|row| row.iter().all(|value| !value.is_null())));
    }

    #[test]
    fn transforms_are_idempotent() {
        let input = sample();

        let once = deduplicate(&input);
        assert_eq!(deduplicate(&once), once);

        let once = drop_incomplete(&input);
        assert_eq!(drop_incomplete(&once), once);

        let once = clean(&input);
        assert_eq!(clean(&once), once);
    }

    #[test]
    fn clean_never_changes_columns() {
        let input = sample();
        let cleaned = clean(&input);

        assert_eq!(cleaned.columns(), input.columns());
    }

    #[test]
    fn report_accounts_for_every_removed_row() {
        let (cleaned, report) = clean_with_report(&sample());

        assert_eq!(
            report,
            CleaningReport {
                input_rows: 6,
                duplicate_rows: 2,
                incomplete_rows: 1,
                output_rows: 3,
            }
        );
        assert_eq!(cleaned.len(), report.output_rows);
    }

    #[test]
    fn empty_table_stays_empty() {
        let input = table(&["a"], Vec::new());
        let (cleaned, report) = clean_with_report(&input);

        assert!(cleaned.is_empty());
        assert_eq!(cleaned.columns(), &["a".to_string()]);
        assert_eq!(report.output_rows, 0);
    }
}
