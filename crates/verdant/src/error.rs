//! Study-level error type.

use thiserror::Error;
use verdant_data::DataError;
use verdant_models::ModelError;
use verdant_output::ExportError;

/// Errors that can abort a study run.
#[derive(Debug, Error)]
pub enum StudyError {
    /// Loading or validating the dataset failed
    #[error(transparent)]
    Data(#[from] DataError),

    /// A model failed to fit or evaluate
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Writing results failed
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
