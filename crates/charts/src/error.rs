//! Error types for the charts crate

use thiserror::Error;

/// Errors that can occur when reading or writing chart parts
#[derive(Error, Debug)]
pub enum ChartError {
    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// The chart part parsed but describes no supported plot
    #[error("Invalid chart data: {0}")]
    InvalidData(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<quick_xml::Error> for ChartError {
    fn from(err: quick_xml::Error) -> Self {
        ChartError::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ChartError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        ChartError::XmlParse(err.to_string())
    }
}

impl From<std::io::Error> for ChartError {
    fn from(err: std::io::Error) -> Self {
        ChartError::Serialization(err.to_string())
    }
}

/// Result type for chart operations
pub type ChartResult<T> = Result<T, ChartError>;
