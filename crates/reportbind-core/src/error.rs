//! Error types for reportbind-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in reportbind-core
#[derive(Debug, Error)]
pub enum Error {
    /// Argument outside the domain of an operation (e.g. column ordinal 0)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A data row does not have one value per field
    #[error("Row {row} has {actual} values but {expected} fields were declared")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Result JSON could not be decoded
    #[error("Invalid result JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
