//! Dataset store
//!
//! Owns all Dataset records. Uploads are parsed, then the metadata row and
//! every data row are inserted in one transaction, so a dataset is either
//! fully present or absent. Records are never mutated after creation.

use chrono::{DateTime, Utc};
use dqm_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;

pub mod parse;

pub use parse::CellValue;

/// An uploaded dataset, reassembled from storage.
///
/// `id` is the monotonically increasing creation sequence; `columns` is
/// fixed at parse time and `rows` are positionally aligned with it.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub id: i64,
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub created_at: DateTime<Utc>,
}

impl Dataset {
    pub fn row_count(&self) -> u64 {
        self.rows.len() as u64
    }
}

/// SQLite-backed store for datasets and their rows
#[derive(Clone)]
pub struct DatasetStore {
    pool: SqlitePool,
}

impl DatasetStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Parse delimited content and persist it as a new dataset.
    ///
    /// Fails with `Error::Parse` on invalid UTF-8, malformed delimited
    /// text, zero data rows, or duplicate header names.
    pub async fn create(&self, name: &str, bytes: &[u8]) -> Result<Dataset> {
        let content = std::str::from_utf8(bytes)
            .map_err(|_| Error::Parse("content is not valid UTF-8".to_string()))?;
        let table = parse::parse_delimited(content)?;

        let columns_json = serde_json::to_string(&table.columns)
            .map_err(|e| Error::Internal(format!("column encoding failed: {}", e)))?;
        let created_at = Utc::now();

        let mut tx = self.pool.begin().await?;

        let dataset_id = sqlx::query(
            "INSERT INTO datasets (dataset_name, columns, row_count, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(&columns_json)
        .bind(table.rows.len() as i64)
        .bind(created_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for row in &table.rows {
            let row_json = serde_json::to_string(row)
                .map_err(|e| Error::Internal(format!("row encoding failed: {}", e)))?;
            sqlx::query("INSERT INTO dataset_rows (dataset_id, row_data) VALUES (?, ?)")
                .bind(dataset_id)
                .bind(&row_json)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            "Stored dataset {} ({}, {} rows, {} columns)",
            dataset_id,
            name,
            table.rows.len(),
            table.columns.len()
        );

        Ok(Dataset {
            id: dataset_id,
            name: name.to_string(),
            columns: table.columns,
            rows: table.rows,
            created_at,
        })
    }

    /// Create a metadata-only dataset with zero rows.
    ///
    /// Such a dataset exists (it counts toward totals and can be the
    /// latest) but cannot be evaluated until content semantics change.
    pub async fn create_empty(&self, name: &str) -> Result<i64> {
        let dataset_id = sqlx::query(
            "INSERT INTO datasets (dataset_name, columns, row_count, created_at) VALUES (?, '[]', 0, ?)",
        )
        .bind(name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!("Created empty dataset {} ({})", dataset_id, name);
        Ok(dataset_id)
    }

    /// Load a dataset with all of its rows, in insertion order
    pub async fn get(&self, id: i64) -> Result<Dataset> {
        let record: Option<(String, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT dataset_name, columns, created_at FROM datasets WHERE dataset_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let (name, columns_json, created_at) =
            record.ok_or_else(|| Error::NotFound(format!("dataset {}", id)))?;

        let columns: Vec<String> = serde_json::from_str(&columns_json)
            .map_err(|e| Error::Internal(format!("stored columns corrupt: {}", e)))?;

        let row_blobs: Vec<String> = sqlx::query_scalar(
            "SELECT row_data FROM dataset_rows WHERE dataset_id = ? ORDER BY row_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut rows = Vec::with_capacity(row_blobs.len());
        for blob in &row_blobs {
            let row: Vec<CellValue> = serde_json::from_str(blob)
                .map_err(|e| Error::Internal(format!("stored row corrupt: {}", e)))?;
            rows.push(row);
        }

        Ok(Dataset {
            id,
            name,
            columns,
            rows,
            created_at,
        })
    }

    /// Id of the most recently created dataset, `None` when the store is
    /// empty (an empty store is not an error)
    pub async fn latest(&self) -> Result<Option<i64>> {
        let id: Option<i64> =
            sqlx::query_scalar("SELECT dataset_id FROM datasets ORDER BY dataset_id DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;
        Ok(id)
    }
}
