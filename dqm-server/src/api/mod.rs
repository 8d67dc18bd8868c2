//! HTTP API handlers for dqm-server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dqm_common::Error;
use serde_json::json;
use tracing::error;

pub mod dashboard;
pub mod datasets;
pub mod health;

pub use dashboard::dashboard_summary;
pub use datasets::{create_dataset, get_latest_dataset, run_checks, upload_dataset};
pub use health::health_routes;

/// Engine error adapted to the HTTP boundary.
///
/// Each caller-visible engine condition maps to a distinct client status;
/// anything unexpected becomes a 500 without leaking internal state.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::Parse(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Error::InvalidDataset(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            err => {
                error!("Internal error serving request: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
