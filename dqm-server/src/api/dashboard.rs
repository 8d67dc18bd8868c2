//! Dashboard summary endpoint

use axum::{extract::State, Json};

use crate::stats::AggregateStats;
use crate::AppState;

/// GET /dashboard/summary
///
/// A consistent snapshot of the cross-dataset aggregates. A run-checks
/// call that has returned is always visible here.
pub async fn dashboard_summary(State(state): State<AppState>) -> Json<AggregateStats> {
    Json(state.stats.snapshot())
}
