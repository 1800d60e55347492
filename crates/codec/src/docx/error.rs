//! Error types for DOCX operations

use thiserror::Error;

/// Errors that can occur during DOCX import/export
#[derive(Debug, Error)]
pub enum DocxError {
    /// The package file or a requested part does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The bytes cannot be opened as a ZIP package
    #[error("Invalid container: {0}")]
    InvalidContainer(String),

    /// A part failed to parse as XML
    #[error("Invalid markup: {0}")]
    InvalidMarkup(String),

    /// Parsing failed for a reason other than malformed XML
    #[error("Parsing failed: {0}")]
    ParsingFailed(String),

    /// IO error (permission denied, disk full, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The `basedOn` chain of a table style loops back on itself
    #[error("Style inheritance cycle: {0}")]
    StyleCycle(String),

    /// Chart part error
    #[error("Chart error: {0}")]
    Chart(#[from] charts::ChartError),

    /// Output could not be produced
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<zip::result::ZipError> for DocxError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::FileNotFound => DocxError::NotFound("package entry".into()),
            zip::result::ZipError::Io(e) => DocxError::Io(e),
            other => DocxError::InvalidContainer(other.to_string()),
        }
    }
}

impl From<quick_xml::Error> for DocxError {
    fn from(err: quick_xml::Error) -> Self {
        DocxError::InvalidMarkup(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DocxError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        DocxError::InvalidMarkup(format!("Attribute error: {}", err))
    }
}

impl From<std::string::FromUtf8Error> for DocxError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        DocxError::InvalidMarkup(format!("part is not UTF-8: {}", err))
    }
}

/// Result type for DOCX operations
pub type DocxResult<T> = std::result::Result<T, DocxError>;
