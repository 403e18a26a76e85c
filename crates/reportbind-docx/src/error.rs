//! Binding error types

use thiserror::Error;

use crate::placeholder::PlaceholderKind;

/// Result type for binding operations
pub type BindResult<T> = std::result::Result<T, BindError>;

/// Why a single placeholder could not be bound
#[derive(Debug, Error)]
pub enum PlaceholderError {
    /// A single-value placeholder received more than one row
    #[error("expected a single row, got {rows}")]
    Cardinality { rows: usize },

    /// The content control does not follow the template conventions
    #[error("template contract violation: {0}")]
    TemplateContract(String),

    /// Chart synchronization failed
    #[error(transparent)]
    Chart(#[from] reportbind_chart::ChartError),

    /// Embedded workbook synchronization failed
    #[error(transparent)]
    Xlsx(#[from] reportbind_xlsx::XlsxError),

    /// Package or XML error while touching parts the placeholder owns
    #[error(transparent)]
    Opc(#[from] reportbind_opc::OpcError),
}

/// Errors that can occur while binding a document
#[derive(Debug, Error)]
pub enum BindError {
    /// Package or XML error
    #[error("Package error: {0}")]
    Opc(#[from] reportbind_opc::OpcError),

    /// The document does not follow the template conventions
    #[error("Template contract violation: {0}")]
    TemplateContract(String),

    /// A placeholder failed to bind
    #[error("Placeholder '{title}' ({kind}): {source}")]
    Placeholder {
        title: String,
        kind: PlaceholderKind,
        source: PlaceholderError,
    },
}

impl BindError {
    /// The placeholder error, when the failure belongs to one placeholder
    pub fn placeholder_error(&self) -> Option<&PlaceholderError> {
        match self {
            BindError::Placeholder { source, .. } => Some(source),
            _ => None,
        }
    }
}
