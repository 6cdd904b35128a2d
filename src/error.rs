//! Error types for agenda operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgendaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to persist {path}: {reason}")]
    Persist { path: String, reason: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("No event {id} on {date}")]
    EventNotFound { date: String, id: i64 },

    #[error("Could not determine data directory")]
    NoDataDir,
}

pub type AgendaResult<T> = Result<T, AgendaError>;
