//! Duplicate check: full-row duplicates beyond the first occurrence

use std::collections::HashSet;

use super::{Check, CheckName, CheckOutcome};
use crate::store::Dataset;

/// A row fails if its full value tuple is identical to an earlier row's.
///
/// Rows are keyed by their JSON encoding, the same form they persist in,
/// so tuple equality matches storage equality exactly.
pub struct DuplicateCheck;

impl Check for DuplicateCheck {
    fn name(&self) -> CheckName {
        CheckName::DuplicateCheck
    }

    fn evaluate(&self, dataset: &Dataset) -> CheckOutcome {
        let mut seen: HashSet<String> = HashSet::with_capacity(dataset.rows.len());
        let mut failed_row_indices = Vec::new();

        for (i, row) in dataset.rows.iter().enumerate() {
            let key = serde_json::to_string(row).unwrap_or_default();
            if !seen.insert(key) {
                failed_row_indices.push(i);
            }
        }

        CheckOutcome { failed_row_indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::parse::parse_delimited;
    use chrono::Utc;

    fn dataset(content: &str) -> Dataset {
        let table = parse_delimited(content).unwrap();
        Dataset {
            id: 1,
            name: "test.csv".to_string(),
            columns: table.columns,
            rows: table.rows,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn distinct_rows_pass() {
        let outcome = DuplicateCheck.evaluate(&dataset("a,b\n1,2\n3,4\n"));
        assert!(outcome.failed_row_indices.is_empty());
    }

    #[test]
    fn first_occurrence_does_not_fail() {
        let outcome = DuplicateCheck.evaluate(&dataset("a,b\nx,y\nx,y\nz,w\n"));
        assert_eq!(outcome.failed_row_indices, vec![1]);
    }

    #[test]
    fn each_extra_copy_fails_once() {
        let outcome = DuplicateCheck.evaluate(&dataset("a\n1\n1\n1\n"));
        assert_eq!(outcome.failed_row_indices, vec![1, 2]);
    }

    #[test]
    fn partial_overlap_is_not_a_duplicate() {
        let outcome = DuplicateCheck.evaluate(&dataset("a,b\n1,2\n1,3\n"));
        assert!(outcome.failed_row_indices.is_empty());
    }

    #[test]
    fn null_rows_compare_equal() {
        let outcome = DuplicateCheck.evaluate(&dataset("a,b\n1,\n1,\n"));
        assert_eq!(outcome.failed_row_indices, vec![1]);
    }
}
