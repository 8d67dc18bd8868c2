//! Check executor
//!
//! Runs the registry's battery against one dataset: loads the rows,
//! evaluates every check in registry order, derives the overall score,
//! persists the run in one transaction, and folds it into the aggregate
//! tracker before the result is returned to the caller.

use std::sync::Arc;

use chrono::Utc;
use dqm_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;

use super::{CheckRegistry, CheckResult, CheckRun, CheckStatus};
use crate::stats::AggregateTracker;
use crate::store::DatasetStore;

pub struct CheckExecutor {
    pool: SqlitePool,
    store: DatasetStore,
    registry: Arc<CheckRegistry>,
    tracker: Arc<AggregateTracker>,
}

impl CheckExecutor {
    pub fn new(
        pool: SqlitePool,
        store: DatasetStore,
        registry: Arc<CheckRegistry>,
        tracker: Arc<AggregateTracker>,
    ) -> Self {
        Self {
            pool,
            store,
            registry,
            tracker,
        }
    }

    /// Evaluate every registered check against the dataset.
    ///
    /// Either a full CheckRun is produced, persisted and recorded, or the
    /// call fails with no trace in storage or the aggregates.
    pub async fn run(&self, dataset_id: i64) -> Result<CheckRun> {
        let dataset = self.store.get(dataset_id).await?;
        if dataset.rows.is_empty() {
            return Err(Error::InvalidDataset(format!(
                "dataset {} has no rows to evaluate",
                dataset_id
            )));
        }

        let tolerance = self.registry.tolerance();
        let mut checks = Vec::with_capacity(self.registry.len());
        for check in self.registry.iter() {
            let outcome = check.evaluate(&dataset);
            let failed_rows = outcome.failed_row_indices.len() as u64;
            let status = if failed_rows > tolerance {
                CheckStatus::Fail
            } else {
                CheckStatus::Pass
            };
            checks.push(CheckResult {
                check_name: check.name(),
                status,
                failed_rows,
            });
        }

        let passed = checks.iter().filter(|c| c.status == CheckStatus::Pass).count();
        let overall_score = if checks.is_empty() {
            100
        } else {
            (100.0 * passed as f64 / checks.len() as f64).round() as u8
        };

        let run = CheckRun {
            dataset_id,
            overall_score,
            checks,
            completed_at: Utc::now(),
        };

        self.persist(&run).await?;
        self.tracker.record(&run);

        info!(
            "Checks complete for dataset {}: score {} ({}/{} passed)",
            dataset_id,
            run.overall_score,
            passed,
            run.checks.len()
        );

        Ok(run)
    }

    /// Persist the run header and its per-check results atomically
    async fn persist(&self, run: &CheckRun) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let run_id = sqlx::query(
            "INSERT INTO check_runs (dataset_id, overall_score, created_at) VALUES (?, ?, ?)",
        )
        .bind(run.dataset_id)
        .bind(run.overall_score as i64)
        .bind(run.completed_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for result in &run.checks {
            sqlx::query(
                "INSERT INTO check_results (run_id, check_name, status, failed_rows) VALUES (?, ?, ?, ?)",
            )
            .bind(run_id)
            .bind(result.check_name.as_str())
            .bind(result.status.as_str())
            .bind(result.failed_rows as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
