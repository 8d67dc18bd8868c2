//! Aggregate tracker
//!
//! Process-wide rolling statistics shown on the dashboard. All mutation
//! goes through two narrow methods (`record`, `dataset_created`) guarded
//! by a single mutex; readers get a consistent point-in-time snapshot.
//! The lock is synchronous and never held across an await point.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use dqm_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::checks::CheckRun;

/// Dashboard summary, the serialized form of the tracker's state
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AggregateStats {
    pub total_datasets: u64,
    pub average_quality_score: u8,
    pub failed_checks: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub total_checks: u64,
}

#[derive(Debug, Default)]
struct TrackerState {
    total_datasets: u64,
    total_checks: u64,
    failed_checks: u64,
    completed_runs: u64,
    score_sum: u64,
    last_run: Option<DateTime<Utc>>,
}

/// Exclusive owner of the process-wide aggregate statistics
#[derive(Debug, Default)]
pub struct AggregateTracker {
    state: Mutex<TrackerState>,
}

impl AggregateTracker {
    /// Fresh tracker with the zero/absent initial state
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild tracker state from the database at startup, so dashboard
    /// reads stay consistent with persisted datasets and runs across
    /// restarts.
    pub async fn hydrate(pool: &SqlitePool) -> Result<Self> {
        let total_datasets: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM datasets")
            .fetch_one(pool)
            .await?;
        let total_checks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM check_results")
            .fetch_one(pool)
            .await?;
        let failed_checks: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM check_results WHERE status = 'FAIL'")
                .fetch_one(pool)
                .await?;
        let (completed_runs, score_sum): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(overall_score), 0) FROM check_runs",
        )
        .fetch_one(pool)
        .await?;
        let last_run: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MAX(created_at) FROM check_runs")
                .fetch_one(pool)
                .await?;

        Ok(Self {
            state: Mutex::new(TrackerState {
                total_datasets: total_datasets as u64,
                total_checks: total_checks as u64,
                failed_checks: failed_checks as u64,
                completed_runs: completed_runs as u64,
                score_sum: score_sum as u64,
                last_run,
            }),
        })
    }

    /// Fold one completed run into the aggregates. The only run-mutator;
    /// called after the run is persisted, never for a failed run.
    pub fn record(&self, run: &CheckRun) {
        let mut state = self.state.lock().expect("stats lock poisoned");
        state.total_checks += run.checks.len() as u64;
        state.failed_checks += run
            .checks
            .iter()
            .filter(|c| c.status == crate::checks::CheckStatus::Fail)
            .count() as u64;
        state.completed_runs += 1;
        state.score_sum += run.overall_score as u64;
        state.last_run = Some(run.completed_at);
    }

    /// A dataset was created. Signalled by the upload/create paths, not by
    /// `record`: a dataset may exist with zero runs.
    pub fn dataset_created(&self) {
        let mut state = self.state.lock().expect("stats lock poisoned");
        state.total_datasets += 1;
    }

    /// Consistent point-in-time copy for the dashboard
    pub fn snapshot(&self) -> AggregateStats {
        let state = self.state.lock().expect("stats lock poisoned");
        let average_quality_score = if state.completed_runs == 0 {
            0
        } else {
            (state.score_sum as f64 / state.completed_runs as f64).round() as u8
        };
        AggregateStats {
            total_datasets: state.total_datasets,
            average_quality_score,
            failed_checks: state.failed_checks,
            last_run: state.last_run,
            total_checks: state.total_checks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CheckName, CheckResult, CheckRun, CheckStatus};

    fn run(score: u8, failed: usize) -> CheckRun {
        let checks = (0..3)
            .map(|i| CheckResult {
                check_name: CheckName::NullCheck,
                status: if i < failed {
                    CheckStatus::Fail
                } else {
                    CheckStatus::Pass
                },
                failed_rows: 0,
            })
            .collect();
        CheckRun {
            dataset_id: 1,
            overall_score: score,
            checks,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn initial_snapshot_is_zero() {
        let snapshot = AggregateTracker::new().snapshot();
        assert_eq!(snapshot.total_datasets, 0);
        assert_eq!(snapshot.total_checks, 0);
        assert_eq!(snapshot.failed_checks, 0);
        assert_eq!(snapshot.average_quality_score, 0);
        assert_eq!(snapshot.last_run, None);
    }

    #[test]
    fn record_accumulates() {
        let tracker = AggregateTracker::new();
        tracker.dataset_created();
        tracker.record(&run(100, 0));
        tracker.record(&run(67, 1));

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.total_datasets, 1);
        assert_eq!(snapshot.total_checks, 6);
        assert_eq!(snapshot.failed_checks, 1);
        // round(mean(100, 67)) = round(83.5) = 84
        assert_eq!(snapshot.average_quality_score, 84);
        assert!(snapshot.last_run.is_some());
    }

    #[test]
    fn dataset_creation_does_not_touch_run_stats() {
        let tracker = AggregateTracker::new();
        tracker.dataset_created();
        tracker.dataset_created();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.total_datasets, 2);
        assert_eq!(snapshot.total_checks, 0);
        assert_eq!(snapshot.last_run, None);
    }

    #[test]
    fn last_run_follows_latest_record() {
        let tracker = AggregateTracker::new();
        let first = run(100, 0);
        let second = run(100, 0);
        tracker.record(&first);
        tracker.record(&second);
        assert_eq!(tracker.snapshot().last_run, Some(second.completed_at));
    }
}
