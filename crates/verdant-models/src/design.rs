//! Design matrices and feature standardization.

use crate::error::ModelError;
use ndarray::{Array1, Array2, Axis};
use smartcore::linalg::basic::matrix::DenseMatrix;
use verdant_data::CompleteObservation;

/// Predictors and target of a set of complete rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    /// Predictors (rows x features)
    pub x: Array2<f64>,
    /// Target (rows)
    pub y: Array1<f64>,
}

impl DesignMatrix {
    /// Stack rows into a matrix.
    ///
    /// # Errors
    /// Returns an error when `rows` is empty or the rows disagree on the
    /// number of features.
    pub fn from_rows(rows: &[CompleteObservation]) -> Result<Self, ModelError> {
        let first = rows.first().ok_or(ModelError::InsufficientSamples {
            required: 1,
            actual: 0,
        })?;
        let n_features = first.features.len();

        let mut values = Vec::with_capacity(rows.len() * n_features);
        for row in rows {
            if row.features.len() != n_features {
                return Err(ModelError::DimensionMismatch {
                    expected: n_features,
                    actual: row.features.len(),
                });
            }
            values.extend_from_slice(&row.features);
        }

        let x = Array2::from_shape_vec((rows.len(), n_features), values)
            .map_err(|e| ModelError::InvalidParameter(e.to_string()))?;
        let y = rows.iter().map(|row| row.target).collect();

        Ok(Self { x, y })
    }

    /// Number of rows.
    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    /// Number of predictors.
    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }
}

/// Column-wise z-scoring fitted on one matrix and applied to others.
///
/// Uses the population standard deviation. Columns with (near) zero variance
/// are only centered.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Fit means and scales on `x`.
    ///
    /// # Errors
    /// Returns an error when `x` has no rows.
    pub fn fit(x: &Array2<f64>) -> Result<Self, ModelError> {
        let mean = x
            .mean_axis(Axis(0))
            .ok_or(ModelError::InsufficientSamples {
                required: 1,
                actual: 0,
            })?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s < 10.0 * f64::EPSILON { 1.0 } else { s });

        Ok(Self { mean, scale })
    }

    /// Standardize `x` with the fitted parameters.
    ///
    /// # Errors
    /// Returns an error when `x` has a different number of columns than the
    /// matrix the scaler was fitted on.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        if x.ncols() != self.mean.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.mean.len(),
                actual: x.ncols(),
            });
        }
        Ok((x - &self.mean) / &self.scale)
    }

    /// Column means.
    pub const fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Column scales.
    pub const fn scale(&self) -> &Array1<f64> {
        &self.scale
    }
}

/// Copy an ndarray matrix into the regression library's dense layout.
pub(crate) fn to_dense(x: &Array2<f64>) -> DenseMatrix<f64> {
    let (n_rows, n_cols) = x.dim();
    DenseMatrix::new(n_rows, n_cols, x.iter().copied().collect(), false)
}
