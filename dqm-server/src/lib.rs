//! dqm-server library - data quality monitoring service
//!
//! Wires the engine components (dataset store, check registry, check
//! executor, aggregate tracker) into shared application state and exposes
//! them through the HTTP router.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use dqm_common::config::ChecksConfig;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod checks;
pub mod stats;
pub mod store;

use checks::{executor::CheckExecutor, CheckRegistry};
use stats::AggregateTracker;
use store::DatasetStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Dataset store (exclusive owner of dataset records)
    pub store: DatasetStore,
    /// Check executor over the standard registry
    pub executor: Arc<CheckExecutor>,
    /// Aggregate tracker (exclusive owner of dashboard stats)
    pub stats: Arc<AggregateTracker>,
}

impl AppState {
    /// Wire the engine together around one pool and a hydrated tracker
    pub fn new(db: SqlitePool, checks_config: ChecksConfig, stats: Arc<AggregateTracker>) -> Self {
        let store = DatasetStore::new(db.clone());
        let registry = Arc::new(CheckRegistry::standard(checks_config));
        let executor = Arc::new(CheckExecutor::new(
            db.clone(),
            store.clone(),
            registry,
            stats.clone(),
        ));
        Self {
            db,
            store,
            executor,
            stats,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/datasets/upload", post(api::upload_dataset))
        .route("/datasets/create", post(api::create_dataset))
        .route("/datasets/run-checks/:dataset_id", post(api::run_checks))
        .route("/datasets/latest", get(api::get_latest_dataset))
        .route("/dashboard/summary", get(api::dashboard_summary))
        .merge(api::health_routes())
        // Browser dashboard runs on a different origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
