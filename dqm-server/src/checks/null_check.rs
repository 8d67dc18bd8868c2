//! Null check: rows with any absent/empty field

use super::{Check, CheckName, CheckOutcome};
use crate::store::Dataset;

/// A row fails if any of its cells is null
pub struct NullCheck;

impl Check for NullCheck {
    fn name(&self) -> CheckName {
        CheckName::NullCheck
    }

    fn evaluate(&self, dataset: &Dataset) -> CheckOutcome {
        let failed_row_indices = dataset
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|cell| cell.is_null()))
            .map(|(i, _)| i)
            .collect();
        CheckOutcome { failed_row_indices }
    }
}
