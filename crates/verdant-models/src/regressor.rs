//! Common interface over fitted regression models.

use crate::error::ModelError;
use crate::metrics::RegressionMetrics;
use ndarray::{Array1, Array2};

/// A fitted model that maps predictor rows to target predictions.
pub trait Regressor {
    /// Predict the target for each row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>, ModelError>;

    /// Predict `x` and score the predictions against `y`.
    fn evaluate(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<RegressionMetrics, ModelError> {
        let predictions = self.predict(x)?;
        RegressionMetrics::evaluate(&y.to_vec(), &predictions)
    }
}
