//! Health and status endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /
///
/// Liveness probe kept for clients that poll the service root.
pub async fn root() -> Json<Value> {
    Json(json!({ "status": "API is running" }))
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "dqm-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /health/db
///
/// Round-trips a trivial query so monitoring can tell a wedged database
/// apart from a dead process.
pub async fn db_health(State(state): State<AppState>) -> Json<Value> {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => Json(json!({ "db_status": "connected" })),
        Err(e) => Json(json!({ "db_status": "failed", "error": e.to_string() })),
    }
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/health/db", get(db_health))
}
