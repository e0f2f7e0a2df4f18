//! Lasso with cross-validated regularization strength.
//!
//! The strength is picked from a log-spaced grid that starts at the smallest
//! alpha zeroing every coefficient, `max_j |x_j · (y - ȳ)| / n`, and ends at
//! `eps` times that value. Each candidate is scored by mean held-out MSE over
//! contiguous K folds of the training rows; the winner is refit on all rows.
//! Individual fits are delegated to smartcore's `Lasso`.
//!
//! Alphas are expressed for the objective `||y - Xw||² / (2n) + alpha·||w||₁`.
//! smartcore minimizes `||y - Xw||² + n·alpha·||w||₁`, so the value handed to
//! it is doubled. smartcore also takes `mean(y)` as the intercept without
//! looking at the column means of `X`, so every fit centers its predictors
//! first; fold subsets of a standardized window are not centered.

use crate::design::to_dense;
use crate::error::ModelError;
use crate::regressor::Regressor;
use log::debug;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::lasso::{Lasso, LassoParameters};

/// Cross-validated Lasso configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LassoCvConfig {
    /// Number of folds (default: 5)
    pub cv_folds: usize,
    /// Number of candidate alphas (default: 100)
    pub n_alphas: usize,
    /// Ratio of the smallest to the largest candidate alpha (default: 1e-3)
    pub eps: f64,
    /// Solver iteration limit per fit (default: 1000)
    pub max_iter: usize,
    /// Solver tolerance (default: 1e-4)
    pub tol: f64,
    /// Seed recorded with the run. Folds are contiguous, so selection does not
    /// depend on it (default: 42)
    pub random_state: u64,
}

impl Default for LassoCvConfig {
    fn default() -> Self {
        Self {
            cv_folds: 5,
            n_alphas: 100,
            eps: 1e-3,
            max_iter: 1000,
            tol: 1e-4,
            random_state: 42,
        }
    }
}

impl LassoCvConfig {
    /// Check parameter ranges.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidParameter`] for fewer than two folds, an
    /// empty alpha grid, `eps` outside `(0, 1]`, or a zero iteration limit.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.cv_folds < 2 {
            return Err(ModelError::InvalidParameter(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        if self.n_alphas == 0 {
            return Err(ModelError::InvalidParameter("n_alphas must be positive".into()));
        }
        if !(self.eps > 0.0 && self.eps <= 1.0) {
            return Err(ModelError::InvalidParameter(format!(
                "eps must be in (0, 1], got {}",
                self.eps
            )));
        }
        if self.max_iter == 0 || self.tol <= 0.0 {
            return Err(ModelError::InvalidParameter(
                "max_iter and tol must be positive".into(),
            ));
        }
        Ok(())
    }

    fn parameters(&self, alpha: f64) -> LassoParameters {
        LassoParameters::default()
            .with_alpha(2.0 * alpha)
            .with_normalize(false)
            .with_tol(self.tol)
            .with_max_iter(self.max_iter)
    }
}

/// A Lasso fit at a fixed alpha, with an intercept.
#[derive(Debug)]
pub struct LassoModel {
    inner: Lasso<f64, f64, DenseMatrix<f64>, Vec<f64>>,
    x_mean: Array1<f64>,
    alpha: f64,
}

impl LassoModel {
    /// Fit at `alpha`. Predictors are centered on their own means, so the
    /// intercept is `mean(y) - w · mean(x)` whatever the input offset.
    ///
    /// # Errors
    /// Returns an error if `x` has no rows or the regression library rejects
    /// the data.
    pub fn fit(
        x: &Array2<f64>,
        y: &Array1<f64>,
        alpha: f64,
        config: &LassoCvConfig,
    ) -> Result<Self, ModelError> {
        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or(ModelError::InsufficientSamples {
                required: 1,
                actual: 0,
            })?;
        let centered = x - &x_mean;
        let inner = Lasso::fit(&to_dense(&centered), &y.to_vec(), config.parameters(alpha))?;
        Ok(Self {
            inner,
            x_mean,
            alpha,
        })
    }

    /// Regularization strength of this fit.
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Regressor for LassoModel {
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>, ModelError> {
        if x.ncols() != self.x_mean.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.x_mean.len(),
                actual: x.ncols(),
            });
        }
        let centered = x - &self.x_mean;
        Ok(self.inner.predict(&to_dense(&centered))?)
    }
}

/// Result of a cross-validated fit.
#[derive(Debug)]
pub struct LassoCvFit {
    /// Model refit on all rows with the selected alpha
    pub model: LassoModel,
    /// Selected alpha
    pub alpha: f64,
    /// Candidate alphas, largest first
    pub alphas: Vec<f64>,
    /// Mean held-out MSE per candidate
    pub mean_mse: Vec<f64>,
}

/// Cross-validated Lasso estimator.
#[derive(Debug, Clone)]
pub struct LassoCv {
    config: LassoCvConfig,
}

impl LassoCv {
    /// Create an estimator.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: LassoCvConfig) -> Result<Self, ModelError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create with default configuration.
    ///
    /// # Errors
    /// Returns an error if the default configuration is invalid (should not happen).
    pub fn try_default() -> Result<Self, ModelError> {
        Self::new(LassoCvConfig::default())
    }

    /// Select alpha by K-fold cross-validation and refit on all rows.
    ///
    /// # Errors
    /// Returns an error when there are fewer rows than folds or any fit fails.
    pub fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<LassoCvFit, ModelError> {
        let n_samples = x.nrows();
        if y.len() != n_samples {
            return Err(ModelError::DimensionMismatch {
                expected: n_samples,
                actual: y.len(),
            });
        }

        let folds = kfold_splits(n_samples, self.config.cv_folds)?;
        let alphas = alpha_grid(x, y, self.config.n_alphas, self.config.eps);
        let mut mean_mse = vec![0.0; alphas.len()];

        for (train_idx, test_idx) in &folds {
            let x_train = x.select(Axis(0), train_idx);
            let y_train = y.select(Axis(0), train_idx);
            let x_test = x.select(Axis(0), test_idx);
            let y_test = y.select(Axis(0), test_idx);

            for (slot, &alpha) in mean_mse.iter_mut().zip(&alphas) {
                let model = LassoModel::fit(&x_train, &y_train, alpha, &self.config)?;
                *slot += model.evaluate(&x_test, &y_test)?.mse / folds.len() as f64;
            }
        }

        let best = select_alpha(&mean_mse);
        let alpha = alphas[best];
        debug!(
            "LassoCV selected alpha={:.6} (grid {:.6}..{:.6}, cv mse {:.6})",
            alpha,
            alphas[0],
            alphas[alphas.len() - 1],
            mean_mse[best]
        );

        let model = LassoModel::fit(x, y, alpha, &self.config)?;
        Ok(LassoCvFit {
            model,
            alpha,
            alphas,
            mean_mse,
        })
    }
}

/// Index of the lowest score; ties keep the earlier (larger) alpha.
fn select_alpha(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate() {
        if score < scores[best] {
            best = i;
        }
    }
    best
}

/// Log-spaced alpha candidates from `alpha_max` down to `alpha_max * eps`.
///
/// When the target is constant (or every column is zero) no alpha changes the
/// fit, and a single near-zero candidate is returned.
pub fn alpha_grid(x: &Array2<f64>, y: &Array1<f64>, n_alphas: usize, eps: f64) -> Vec<f64> {
    let n_samples = x.nrows().max(1) as f64;
    let y_mean = y.mean().unwrap_or(0.0);
    let centered = y.mapv(|v| v - y_mean);

    let alpha_max = x
        .t()
        .dot(&centered)
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        / n_samples;

    if alpha_max <= f64::EPSILON || n_alphas == 0 {
        return vec![f64::EPSILON];
    }
    if n_alphas == 1 {
        return vec![alpha_max];
    }

    let log_max = alpha_max.log10();
    let log_min = (alpha_max * eps).log10();
    let step = (log_max - log_min) / (n_alphas - 1) as f64;
    (0..n_alphas)
        .map(|i| 10f64.powf(log_max - step * i as f64))
        .collect()
}

/// Contiguous K-fold splits without shuffling.
///
/// The first `n % k` folds hold one extra row. Returns `(train, test)` index
/// pairs.
///
/// # Errors
/// Returns an error when `k < 2` or `n < k`.
pub fn kfold_splits(n: usize, k: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>, ModelError> {
    if k < 2 {
        return Err(ModelError::InvalidParameter(format!(
            "need at least 2 folds, got {k}"
        )));
    }
    if n < k {
        return Err(ModelError::InsufficientSamples {
            required: k,
            actual: n,
        });
    }

    let base = n / k;
    let extra = n % k;
    let mut splits = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = base + usize::from(fold < extra);
        let end = start + size;
        let test: Vec<usize> = (start..end).collect();
        let train: Vec<usize> = (0..start).chain(end..n).collect();
        splits.push((train, test));
        start = end;
    }

    Ok(splits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::StandardScaler;
    use crate::linear::LinearModel;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    /// Standardized 60x3 design with `y = 2·x0 + 0.5·x1`.
    fn noiseless_design() -> (Array2<f64>, Array1<f64>) {
        let mut rng = StdRng::seed_from_u64(3);
        let raw = Array2::from_shape_fn((60, 3), |_| rng.gen_range(-1.0..1.0));
        let x = StandardScaler::fit(&raw).unwrap().transform(&raw).unwrap();
        let y = x.column(0).mapv(|v| 2.0 * v) + x.column(1).mapv(|v| 0.5 * v);
        (x, y)
    }

    fn spread(values: &[f64]) -> f64 {
        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let min = values.iter().copied().fold(f64::MAX, f64::min);
        max - min
    }

    #[test]
    fn test_config_default() {
        let config = LassoCvConfig::default();
        assert_eq!(config.cv_folds, 5);
        assert_eq!(config.n_alphas, 100);
        assert_eq!(config.random_state, 42);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case(LassoCvConfig { cv_folds: 1, ..Default::default() })]
    #[case(LassoCvConfig { n_alphas: 0, ..Default::default() })]
    #[case(LassoCvConfig { eps: 0.0, ..Default::default() })]
    #[case(LassoCvConfig { eps: 2.0, ..Default::default() })]
    #[case(LassoCvConfig { max_iter: 0, ..Default::default() })]
    fn test_invalid_config(#[case] config: LassoCvConfig) {
        assert!(LassoCv::new(config).is_err());
    }

    #[test]
    fn test_kfold_sizes() {
        let splits = kfold_splits(12, 5).unwrap();
        let sizes: Vec<usize> = splits.iter().map(|(_, test)| test.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2, 2]);

        assert_eq!(splits[0].1, vec![0, 1, 2]);
        assert_eq!(splits[1].0[..3], [0, 1, 2]);
        for (train, test) in &splits {
            assert_eq!(train.len() + test.len(), 12);
            assert!(test.iter().all(|i| !train.contains(i)));
        }
    }

    #[test]
    fn test_kfold_too_few_rows() {
        assert!(matches!(
            kfold_splits(4, 5),
            Err(ModelError::InsufficientSamples {
                required: 5,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_alpha_grid_bounds() {
        let x = array![[-1.0, 0.5], [0.0, -1.0], [1.0, 0.5]];
        let y = array![1.0, 2.0, 3.0];
        let grid = alpha_grid(&x, &y, 5, 1e-2);

        // x^T (y - 2) = [2, 0], so alpha_max = 2 / 3
        assert_eq!(grid.len(), 5);
        assert_relative_eq!(grid[0], 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(grid[4], 2.0 / 300.0, epsilon = 1e-12);
        assert!(grid.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_alpha_grid_constant_target() {
        let x = array![[1.0], [2.0]];
        let y = array![5.0, 5.0];
        assert_eq!(alpha_grid(&x, &y, 100, 1e-3), vec![f64::EPSILON]);
    }

    #[test]
    fn test_select_alpha_prefers_larger_on_tie() {
        assert_eq!(select_alpha(&[2.0, 1.0, 1.0, 3.0]), 1);
        assert_eq!(select_alpha(&[1.0]), 0);
    }

    #[test]
    fn test_largest_grid_alpha_zeroes_coefficients() {
        let (x, y) = noiseless_design();
        let config = LassoCvConfig::default();
        let alpha_max = alpha_grid(&x, &y, 10, 1e-3)[0];

        let at_max = LassoModel::fit(&x, &y, alpha_max, &config).unwrap();
        let predictions = at_max.predict(&x).unwrap();
        assert!(spread(&predictions) < 1e-6, "spread {}", spread(&predictions));
        assert_relative_eq!(predictions[0], y.mean().unwrap(), epsilon = 1e-6);

        let below = LassoModel::fit(&x, &y, 0.8 * alpha_max, &config).unwrap();
        assert!(spread(&below.predict(&x).unwrap()) > 1e-2);
    }

    #[test]
    fn test_fold_fit_recovers_intercept_on_uncentered_rows() {
        let raw = Array2::from_shape_fn((50, 1), |(i, _)| i as f64);
        let x = StandardScaler::fit(&raw).unwrap().transform(&raw).unwrap();
        let y = x.column(0).mapv(|v| 10.0 + 2.0 * v);

        let folds = kfold_splits(50, 5).unwrap();
        let (train, test) = &folds[0];
        let x_train = x.select(Axis(0), train);
        let y_train = y.select(Axis(0), train);
        let x_test = x.select(Axis(0), test);
        let y_test = y.select(Axis(0), test);

        let lasso = LassoModel::fit(&x_train, &y_train, 1e-6, &LassoCvConfig::default()).unwrap();
        let ols = LinearModel::fit(&x_train, &y_train).unwrap();

        let lasso_mse = lasso.evaluate(&x_test, &y_test).unwrap().mse;
        let ols_mse = ols.evaluate(&x_test, &y_test).unwrap().mse;
        assert!(lasso_mse < 1e-4, "lasso fold mse {lasso_mse}");
        assert_relative_eq!(lasso_mse, ols_mse, epsilon = 1e-4);
    }

    #[test]
    fn test_noiseless_signal_selects_smallest_alpha() {
        let (x, y) = noiseless_design();
        let config = LassoCvConfig {
            n_alphas: 5,
            eps: 1e-2,
            ..Default::default()
        };

        let fit = LassoCv::new(config).unwrap().fit(&x, &y).unwrap();

        assert_eq!(fit.alphas.len(), 5);
        assert_eq!(fit.alpha, fit.alphas[4]);
        assert!(fit.mean_mse.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_predict_width_mismatch() {
        let (x, y) = noiseless_design();
        let model = LassoModel::fit(&x, &y, 0.01, &LassoCvConfig::default()).unwrap();
        assert!(matches!(
            model.predict(&array![[1.0, 2.0]]),
            Err(ModelError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }
}
