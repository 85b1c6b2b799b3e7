//! Common error types for the inventory stages

use thiserror::Error;

/// Common result type for inventory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across both stages
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or document contents
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
