//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading and validating the observation table.
#[derive(Debug, Error)]
pub enum DataError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Required columns absent from the header
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Column present but not convertible to the schema type
    #[error("Column '{column}' has an invalid type: {reason}")]
    InvalidColumnType {
        /// Column name
        column: String,
        /// Why the conversion failed
        reason: String,
    },

    /// Invalid loader or schema configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}
