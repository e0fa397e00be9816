//! Error types for digm-core

use thiserror::Error;

/// Main error type for the digm-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rejected operation that would violate an engine invariant
    #[error("validation error: {0}")]
    Validation(String),

    /// Goal not found
    #[error("goal not found: {0}")]
    GoalNotFound(String),

    /// Task not found
    #[error("task not found: {0}")]
    TaskNotFound(String),

    /// Journal entry not found
    #[error("journal entry not found: {0}")]
    JournalEntryNotFound(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Remote sync error
    #[error("sync error: {0}")]
    Sync(String),
}

/// Result type alias for digm-core
pub type Result<T> = std::result::Result<T, Error>;
