//! Random forest over expanding windows.
//!
//! The forest is fit on unscaled predictors. Importance is measured by
//! permutation on the training rows: each column is shuffled in turn and the
//! increase in the forest's MSE is recorded. Increases are clamped at zero and
//! normalized to sum to one per window, then averaged across windows.
//!
//! smartcore grows the trees of one forest sequentially, so the fit itself is
//! single-threaded. Only the importance pass runs on the rayon pool.

use crate::design::{DesignMatrix, to_dense};
use crate::error::ModelError;
use crate::metrics::{RegressionMetrics, WindowMetrics};
use crate::regressor::Regressor;
use crate::window::{ExpandingWindows, SkippedWindow};
use log::{debug, info};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::cmp::Ordering;
use verdant_data::ObservationTable;

/// Random forest configuration
///
/// There is no thread-count setting: tree construction runs on the calling
/// thread and permutation importance uses the global rayon pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees (default: 300)
    pub n_estimators: usize,
    /// Seed for bootstrap sampling and importance shuffles (default: 42)
    pub random_state: u64,
    /// Maximum tree depth, unlimited when `None` (default: None)
    pub max_depth: Option<u16>,
    /// Minimum rows to split a node (default: 2)
    pub min_samples_split: usize,
    /// Minimum rows in a leaf (default: 1)
    pub min_samples_leaf: usize,
    /// Shuffles per feature when measuring importance (default: 5)
    pub importance_repeats: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 300,
            random_state: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            importance_repeats: 5,
        }
    }
}

impl ForestConfig {
    /// Check parameter ranges.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidParameter`] when a count is zero or the
    /// split size is below two.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_estimators == 0 {
            return Err(ModelError::InvalidParameter("n_estimators must be positive".into()));
        }
        if self.importance_repeats == 0 {
            return Err(ModelError::InvalidParameter(
                "importance_repeats must be positive".into(),
            ));
        }
        if self.min_samples_split < 2 || self.min_samples_leaf == 0 {
            return Err(ModelError::InvalidParameter(
                "min_samples_split must be >= 2 and min_samples_leaf >= 1".into(),
            ));
        }
        Ok(())
    }

    fn parameters(&self, n_features: usize) -> RandomForestRegressorParameters {
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(self.n_estimators)
            .with_m(n_features)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_seed(self.random_state);
        match self.max_depth {
            Some(depth) => params.with_max_depth(depth),
            None => params,
        }
    }
}

/// A fitted random forest.
#[derive(Debug)]
pub struct ForestModel {
    inner: RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>,
    n_features: usize,
}

impl ForestModel {
    /// Fit the forest, considering every feature at each split. Trees are
    /// built one after another on the calling thread.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the regression
    /// library rejects the data.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>, config: &ForestConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let n_features = x.ncols();
        let inner = RandomForestRegressor::fit(&to_dense(x), &y.to_vec(), config.parameters(n_features))?;
        Ok(Self { inner, n_features })
    }

    /// Normalized permutation importance of each feature on `(x, y)`.
    ///
    /// Features are scored in parallel; feature `j` draws its shuffles from a
    /// generator seeded with `seed + j`, so the result is deterministic.
    ///
    /// # Errors
    /// Returns an error if `x` has the wrong width or prediction fails.
    pub fn permutation_importance(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        repeats: usize,
        seed: u64,
    ) -> Result<Vec<f64>, ModelError> {
        if x.ncols() != self.n_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }
        let repeats = repeats.max(1);
        let baseline = self.evaluate(x, y)?.mse;
        let y_true = y.to_vec();

        let increases = (0..self.n_features)
            .into_par_iter()
            .map(|feature| -> Result<f64, ModelError> {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(feature as u64));
                let mut order: Vec<usize> = (0..x.nrows()).collect();
                let mut total = 0.0;

                for _ in 0..repeats {
                    order.shuffle(&mut rng);
                    let mut permuted = x.clone();
                    for (row, &source) in order.iter().enumerate() {
                        permuted[[row, feature]] = x[[source, feature]];
                    }
                    let predictions = self.predict(&permuted)?;
                    total += RegressionMetrics::evaluate(&y_true, &predictions)?.mse - baseline;
                }

                Ok((total / repeats as f64).max(0.0))
            })
            .collect::<Result<Vec<f64>, ModelError>>()?;

        Ok(normalize(increases))
    }
}

impl Regressor for ForestModel {
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>, ModelError> {
        Ok(self.inner.predict(&to_dense(x))?)
    }
}

fn normalize(values: Vec<f64>) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total > 0.0 {
        values.into_iter().map(|v| v / total).collect()
    } else {
        vec![0.0; values.len()]
    }
}

/// Importance of one predictor averaged across windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Predictor name
    pub feature: String,
    /// Mean importance across windows
    pub importance: f64,
}

/// Per-window results of the forest plus aggregated importances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForestResults {
    /// Out-of-sample metrics per window
    pub windows: Vec<WindowMetrics>,
    /// Importances averaged across windows, most important first
    pub feature_importances: Vec<FeatureImportance>,
    /// Requested years that produced no window
    pub skipped: Vec<SkippedWindow>,
}

/// Average per-window importance vectors and sort descending.
///
/// No windows yields an empty table.
///
/// # Errors
/// Returns an error if any vector's length differs from `features`.
pub fn aggregate_importances(
    features: &[String],
    per_window: &[Vec<f64>],
) -> Result<Vec<FeatureImportance>, ModelError> {
    if per_window.is_empty() {
        return Ok(Vec::new());
    }

    let mut sums = vec![0.0; features.len()];
    for importances in per_window {
        if importances.len() != features.len() {
            return Err(ModelError::DimensionMismatch {
                expected: features.len(),
                actual: importances.len(),
            });
        }
        for (sum, value) in sums.iter_mut().zip(importances) {
            *sum += value;
        }
    }

    let n_windows = per_window.len() as f64;
    let mut table: Vec<FeatureImportance> = features
        .iter()
        .zip(sums)
        .map(|(feature, sum)| FeatureImportance {
            feature: feature.clone(),
            importance: sum / n_windows,
        })
        .collect();

    // stable: equal importances keep feature order
    table.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(Ordering::Equal)
    });

    Ok(table)
}

/// Fit a random forest on each expanding window and aggregate importances.
///
/// # Errors
/// Any fitting or evaluation failure aborts the run and is returned.
pub fn run_random_forest(
    table: &ObservationTable,
    test_years: &[i32],
    config: &ForestConfig,
) -> Result<ForestResults, ModelError> {
    config.validate()?;
    let plan = ExpandingWindows::new(table, test_years);
    let mut results = ForestResults::default();
    let mut per_window = Vec::new();

    let mut windows = plan.iter();
    for window in windows.by_ref() {
        let train = DesignMatrix::from_rows(&window.train)?;
        let test = DesignMatrix::from_rows(&window.test)?;

        let forest = ForestModel::fit(&train.x, &train.y, config)?;
        let metrics = WindowMetrics::new(
            window.test_year,
            forest.evaluate(&test.x, &test.y)?,
            train.n_samples(),
            test.n_samples(),
        );
        let importances = forest.permutation_importance(
            &train.x,
            &train.y,
            config.importance_repeats,
            config.random_state,
        )?;

        info!(
            "{}: random forest mse={:.6} r2={:.4}",
            window.test_year, metrics.mse, metrics.r2
        );
        debug!("{}: importances {:?}", window.test_year, importances);

        results.windows.push(metrics);
        per_window.push(importances);
    }
    results.skipped = windows.into_skipped();
    results.feature_importances = aggregate_importances(&table.schema().features, &per_window)?;

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{i}")).collect()
    }

    #[test]
    fn test_config_default() {
        let config = ForestConfig::default();
        assert_eq!(config.n_estimators, 300);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.max_depth, None);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case(ForestConfig { n_estimators: 0, ..Default::default() })]
    #[case(ForestConfig { importance_repeats: 0, ..Default::default() })]
    #[case(ForestConfig { min_samples_split: 1, ..Default::default() })]
    #[case(ForestConfig { min_samples_leaf: 0, ..Default::default() })]
    fn test_invalid_config(#[case] config: ForestConfig) {
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_aggregate_means_and_sorts() {
        let per_window = vec![vec![0.1, 0.6, 0.3], vec![0.3, 0.2, 0.5]];
        let table = aggregate_importances(&names(3), &per_window).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table[0].feature, "f1");
        assert_relative_eq!(table[0].importance, 0.4);
        assert_eq!(table[1].feature, "f2");
        assert_relative_eq!(table[1].importance, 0.4);
        assert_eq!(table[2].feature, "f0");
        assert_relative_eq!(table[2].importance, 0.2);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate_importances(&names(9), &[]).unwrap().is_empty());
    }

    #[test]
    fn test_aggregate_length_mismatch() {
        let result = aggregate_importances(&names(2), &[vec![1.0]]);
        assert!(matches!(result, Err(ModelError::DimensionMismatch { .. })));
    }

    #[rstest]
    #[case(vec![1.0, 3.0], vec![0.25, 0.75])]
    #[case(vec![0.0, 0.0], vec![0.0, 0.0])]
    fn test_normalize(#[case] input: Vec<f64>, #[case] expected: Vec<f64>) {
        assert_eq!(normalize(input), expected);
    }
}
