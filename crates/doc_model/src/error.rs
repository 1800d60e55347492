//! Error types for document model operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Projection error: {0}")]
    Projection(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
