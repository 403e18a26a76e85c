//! OPC error types

use thiserror::Error;

/// Result type for package and XML operations
pub type OpcResult<T> = std::result::Result<T, OpcError>;

/// Errors that can occur while reading, editing or writing a package
#[derive(Debug, Error)]
pub enum OpcError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Well-formed bytes that do not make a usable XML part
    #[error("Invalid XML in {part}: {message}")]
    InvalidXml { part: String, message: String },

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Relationship id not present in a part's relationships
    #[error("Relationship {id} not found for part {part}")]
    MissingRelationship { part: String, id: String },
}

impl OpcError {
    pub(crate) fn invalid_xml<P: Into<String>, M: Into<String>>(part: P, message: M) -> Self {
        OpcError::InvalidXml {
            part: part.into(),
            message: message.into(),
        }
    }
}
