//! Anomaly check: numeric outliers beyond a standard-deviation band

use std::collections::BTreeSet;

use super::{Check, CheckName, CheckOutcome};
use crate::store::Dataset;

/// A row fails if any of its numeric values lies more than `sigma`
/// standard deviations from its column's mean.
///
/// Only numeric columns participate: every non-null value must parse as a
/// number. Columns with fewer than 2 numeric samples or zero variance
/// contribute no failures (no meaningful band exists for them). The
/// deviation uses the sample standard deviation (n-1 divisor).
pub struct AnomalyCheck {
    sigma: f64,
}

impl AnomalyCheck {
    pub fn new(sigma: f64) -> Self {
        Self { sigma }
    }
}

impl Check for AnomalyCheck {
    fn name(&self) -> CheckName {
        CheckName::AnomalyCheck
    }

    fn evaluate(&self, dataset: &Dataset) -> CheckOutcome {
        let mut failed: BTreeSet<usize> = BTreeSet::new();

        for col in 0..dataset.columns.len() {
            let Some(samples) = numeric_column(dataset, col) else {
                continue;
            };
            if samples.len() < 2 {
                continue;
            }

            let n = samples.len() as f64;
            let mean = samples.iter().map(|(_, v)| v).sum::<f64>() / n;
            let variance = samples
                .iter()
                .map(|(_, v)| (v - mean).powi(2))
                .sum::<f64>()
                / (n - 1.0);
            let std_dev = variance.sqrt();
            if std_dev == 0.0 {
                continue;
            }

            let bound = self.sigma * std_dev;
            for (row, value) in &samples {
                if (value - mean).abs() > bound {
                    failed.insert(*row);
                }
            }
        }

        CheckOutcome {
            failed_row_indices: failed.into_iter().collect(),
        }
    }
}

/// Non-null values of a column as (row index, value), or `None` when the
/// column holds any non-numeric value
fn numeric_column(dataset: &Dataset, col: usize) -> Option<Vec<(usize, f64)>> {
    let mut samples = Vec::new();
    for (i, row) in dataset.rows.iter().enumerate() {
        let cell = row.get(col)?;
        if cell.is_null() {
            continue;
        }
        samples.push((i, cell.as_number()?));
    }
    if samples.is_empty() {
        None
    } else {
        Some(samples)
    }
}
