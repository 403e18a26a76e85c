//! Chart error types

use thiserror::Error;

/// Result type for chart operations
pub type ChartResult<T> = std::result::Result<T, ChartError>;

/// Errors that can occur while synchronizing a chart part
#[derive(Debug, Error)]
pub enum ChartError {
    /// Package or XML error
    #[error("Package error: {0}")]
    Opc(#[from] reportbind_opc::OpcError),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] reportbind_core::Error),

    /// The chart part does not follow the template conventions
    #[error("Template contract violation: {0}")]
    TemplateContract(String),

    /// Series count still differs from the data after reconciliation
    #[error("Chart has {actual} series after reconciliation, expected {expected}")]
    Reconciliation { expected: usize, actual: usize },
}
