//! Linear and Lasso regression over expanding windows.
//!
//! Predictors are standardized per window (scaler fit on the training slice
//! only) before either model sees them.

use crate::design::{DesignMatrix, StandardScaler, to_dense};
use crate::error::ModelError;
use crate::lasso_cv::{LassoCv, LassoCvConfig};
use crate::metrics::WindowMetrics;
use crate::regressor::Regressor;
use crate::window::{ExpandingWindows, SkippedWindow};
use log::info;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use verdant_data::ObservationTable;

/// Ordinary least squares fit.
#[derive(Debug)]
pub struct LinearModel {
    inner: LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>,
}

impl LinearModel {
    /// Fit with an intercept.
    ///
    /// # Errors
    /// Returns an error if the regression library rejects the data.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Result<Self, ModelError> {
        let inner = LinearRegression::fit(
            &to_dense(x),
            &y.to_vec(),
            LinearRegressionParameters::default(),
        )?;
        Ok(Self { inner })
    }
}

impl Regressor for LinearModel {
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>, ModelError> {
        Ok(self.inner.predict(&to_dense(x))?)
    }
}

/// Lasso metrics for one window, with the strength chosen by cross-validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LassoWindowMetrics {
    /// Selected regularization strength
    pub alpha: f64,
    /// Out-of-sample metrics
    #[serde(flatten)]
    pub metrics: WindowMetrics,
}

/// Per-window results of the linear model family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearModelResults {
    /// Ordinary least squares metrics
    pub linear: Vec<WindowMetrics>,
    /// Cross-validated Lasso metrics
    pub lasso: Vec<LassoWindowMetrics>,
    /// Requested years that produced no window
    pub skipped: Vec<SkippedWindow>,
}

/// Fit linear regression and cross-validated Lasso on each expanding window.
///
/// # Errors
/// Any fitting or evaluation failure aborts the run and is returned.
pub fn run_linear_models(
    table: &ObservationTable,
    test_years: &[i32],
    config: &LassoCvConfig,
) -> Result<LinearModelResults, ModelError> {
    let lasso_cv = LassoCv::new(config.clone())?;
    let plan = ExpandingWindows::new(table, test_years);
    let mut results = LinearModelResults::default();

    let mut windows = plan.iter();
    for window in windows.by_ref() {
        let train = DesignMatrix::from_rows(&window.train)?;
        let test = DesignMatrix::from_rows(&window.test)?;

        let scaler = StandardScaler::fit(&train.x)?;
        let x_train = scaler.transform(&train.x)?;
        let x_test = scaler.transform(&test.x)?;

        let linear = LinearModel::fit(&x_train, &train.y)?;
        let linear_metrics = WindowMetrics::new(
            window.test_year,
            linear.evaluate(&x_test, &test.y)?,
            train.n_samples(),
            test.n_samples(),
        );

        let lasso = lasso_cv.fit(&x_train, &train.y)?;
        let lasso_metrics = WindowMetrics::new(
            window.test_year,
            lasso.model.evaluate(&x_test, &test.y)?,
            train.n_samples(),
            test.n_samples(),
        );

        info!(
            "{}: linear mse={:.6} r2={:.4} | lasso(alpha={:.3}) mse={:.6} r2={:.4}",
            window.test_year,
            linear_metrics.mse,
            linear_metrics.r2,
            lasso.alpha,
            lasso_metrics.mse,
            lasso_metrics.r2
        );

        results.linear.push(linear_metrics);
        results.lasso.push(LassoWindowMetrics {
            alpha: lasso.alpha,
            metrics: lasso_metrics,
        });
    }
    results.skipped = windows.into_skipped();

    Ok(results)
}
