//! Dataset endpoints: upload, create, run-checks, latest

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use dqm_common::Error;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ApiError;
use crate::checks::CheckRun;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub dataset_id: i64,
    pub total_rows: u64,
}

#[derive(Debug, Deserialize)]
pub struct CreateDatasetRequest {
    pub dataset_name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateDatasetResponse {
    pub message: String,
    pub dataset_id: i64,
}

#[derive(Debug, Serialize)]
pub struct LatestDatasetResponse {
    pub dataset_id: Option<i64>,
}

/// POST /datasets/upload
///
/// Multipart upload of a delimited-text file. The file lands in the store
/// as a new dataset; checks run separately on request.
pub async fn upload_dataset(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::InvalidInput("file field has no filename".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidInput(format!("failed to read upload: {}", e)))?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| Error::InvalidInput("missing 'file' field".to_string()))?;

    if !filename.to_lowercase().ends_with(".csv") {
        return Err(Error::InvalidInput("only CSV files are allowed".to_string()).into());
    }

    info!("Upload received: {} ({} bytes)", filename, bytes.len());

    let dataset = state.store.create(&filename, &bytes).await?;
    state.stats.dataset_created();

    Ok(Json(UploadResponse {
        message: "Dataset uploaded successfully".to_string(),
        dataset_id: dataset.id,
        total_rows: dataset.row_count(),
    }))
}

/// POST /datasets/create
///
/// Registers a dataset by name only, with zero rows. Running checks on it
/// reports the dataset as unevaluable until it has content.
pub async fn create_dataset(
    State(state): State<AppState>,
    Json(request): Json<CreateDatasetRequest>,
) -> Result<Json<CreateDatasetResponse>, ApiError> {
    let name = request.dataset_name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("dataset_name must not be empty".to_string()).into());
    }

    let dataset_id = state.store.create_empty(name).await?;
    state.stats.dataset_created();

    Ok(Json(CreateDatasetResponse {
        message: "Dataset created".to_string(),
        dataset_id,
    }))
}

/// POST /datasets/run-checks/:dataset_id
pub async fn run_checks(
    State(state): State<AppState>,
    Path(dataset_id): Path<i64>,
) -> Result<Json<CheckRun>, ApiError> {
    let run = state.executor.run(dataset_id).await?;
    Ok(Json(run))
}

/// GET /datasets/latest
///
/// `dataset_id` is null when nothing has been uploaded yet; an empty
/// store is not an error.
pub async fn get_latest_dataset(
    State(state): State<AppState>,
) -> Result<Json<LatestDatasetResponse>, ApiError> {
    let dataset_id = state.store.latest().await?;
    Ok(Json(LatestDatasetResponse { dataset_id }))
}
