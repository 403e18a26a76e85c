//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while synchronizing an embedded workbook
#[derive(Debug, Error)]
pub enum XlsxError {
    /// Package or XML error
    #[error("Package error: {0}")]
    Opc(#[from] reportbind_opc::OpcError),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] reportbind_core::Error),

    /// The workbook does not follow the template conventions
    #[error("Template contract violation: {0}")]
    TemplateContract(String),
}
