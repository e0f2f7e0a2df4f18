//! Model errors

use smartcore::error::Failed;
use thiserror::Error;

/// Errors that can occur while fitting or evaluating a model
#[derive(Debug, Error)]
pub enum ModelError {
    /// The regression library rejected the fit or prediction
    #[error("Model fitting failed: {0}")]
    Fit(#[from] Failed),

    /// Not enough rows for the requested procedure
    #[error("Insufficient samples: need at least {required}, got {actual}")]
    InsufficientSamples {
        /// Required number of rows
        required: usize,
        /// Actual number of rows
        actual: usize,
    },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
