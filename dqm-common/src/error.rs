//! Common error types for DQM

use thiserror::Error;

/// Common result type for DQM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the engine and the HTTP boundary.
///
/// `Parse`, `NotFound` and `InvalidDataset` are the three caller-visible
/// engine conditions; all are deterministic input problems and never
/// retried.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Uploaded content is not valid delimited text
    #[error("Parse error: {0}")]
    Parse(String),

    /// Requested dataset not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Dataset exists but cannot be evaluated (e.g. zero rows)
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
