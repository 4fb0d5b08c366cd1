use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or reading a table timeline.
#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("Table not found at {0}")]
    TableNotFound(PathBuf),

    #[error("Corrupt timeline marker: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised across the clean pipeline: policy evaluation, planning,
/// execution and instant publication.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),

    #[error("A clean is already requested or inflight at instant {0}")]
    AlreadyInProgress(String),

    #[error("Invalid cleaner configuration: {0}")]
    Policy(String),

    #[error("Storage unreachable: {0}")]
    StorageUnreachable(String),

    #[error("Illegal instant transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Clean instant not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
