//! Out-of-sample evaluation metrics.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Mean squared error and coefficient of determination of one prediction set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean squared error
    pub mse: f64,
    /// R-squared
    pub r2: f64,
}

impl RegressionMetrics {
    /// Score predictions against observed values.
    ///
    /// R² follows the finite convention for a constant target: 1.0 when the
    /// predictions are exact, 0.0 otherwise.
    ///
    /// # Errors
    /// Returns an error if the slices are empty or differ in length.
    pub fn evaluate(y_true: &[f64], y_pred: &[f64]) -> Result<Self, ModelError> {
        let n = y_true.len();
        if n == 0 {
            return Err(ModelError::InsufficientSamples {
                required: 1,
                actual: 0,
            });
        }
        if y_pred.len() != n {
            return Err(ModelError::DimensionMismatch {
                expected: n,
                actual: y_pred.len(),
            });
        }

        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(t, p)| (t - p).powi(2))
            .sum();
        let mean_true = y_true.iter().sum::<f64>() / n as f64;
        let ss_tot: f64 = y_true.iter().map(|t| (t - mean_true).powi(2)).sum();

        let r2 = if ss_tot != 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        Ok(Self {
            mse: ss_res / n as f64,
            r2,
        })
    }
}

/// Metrics of one model on one expanding window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    /// Test year
    pub year: i32,
    /// Mean squared error on the test year
    pub mse: f64,
    /// R-squared on the test year
    pub r2: f64,
    /// Rows used for fitting
    pub train_rows: usize,
    /// Rows used for evaluation
    pub test_rows: usize,
}

impl WindowMetrics {
    /// Attach window bookkeeping to computed metrics.
    pub const fn new(year: i32, metrics: RegressionMetrics, train_rows: usize, test_rows: usize) -> Self {
        Self {
            year,
            mse: metrics.mse,
            r2: metrics.r2,
            train_rows,
            test_rows,
        }
    }
}
