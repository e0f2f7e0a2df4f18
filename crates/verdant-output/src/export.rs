//! CSV export of study results.
//!
//! Rows are written with an explicit header so that empty result sets still
//! produce a well-formed file.

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use verdant_models::{FeatureImportance, ForestResults, LinearModelResults};

/// Column names of the metrics file.
pub const ML_METRICS_HEADER: [&str; 4] = ["model", "year", "mse", "r2"];

/// Column names of the feature importance file.
pub const FEATURE_IMPORTANCES_HEADER: [&str; 2] = ["feature", "importance"];

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One line of the metrics file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRow {
    /// Model label, e.g. `LinearRegression` or `Lasso(alpha=0.012)`.
    pub model: String,

    /// Test year of the window.
    pub year: i32,

    /// Mean squared error.
    pub mse: f64,

    /// R-squared.
    pub r2: f64,
}

impl MetricRow {
    /// Create a new metric row.
    pub fn new(model: impl Into<String>, year: i32, mse: f64, r2: f64) -> Self {
        Self {
            model: model.into(),
            year,
            mse,
            r2,
        }
    }
}

/// Flatten runner results into metric rows: linear, then Lasso, then forest.
pub fn metric_rows(linear: &LinearModelResults, forest: &ForestResults) -> Vec<MetricRow> {
    let ols = linear
        .linear
        .iter()
        .map(|m| MetricRow::new("LinearRegression", m.year, m.mse, m.r2));
    let lasso = linear.lasso.iter().map(|m| {
        MetricRow::new(
            format!("Lasso(alpha={:.3})", m.alpha),
            m.metrics.year,
            m.metrics.mse,
            m.metrics.r2,
        )
    });
    let rf = forest
        .windows
        .iter()
        .map(|m| MetricRow::new("RandomForest", m.year, m.mse, m.r2));

    ols.chain(lasso).chain(rf).collect()
}

fn writer_for(path: &Path) -> Result<csv::Writer<fs::File>, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(csv::WriterBuilder::new().has_headers(false).from_path(path)?)
}

/// Write the metrics file, replacing any existing one.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created or a row
/// fails to serialize.
pub fn write_ml_metrics(path: &Path, rows: &[MetricRow]) -> Result<(), ExportError> {
    let mut wtr = writer_for(path)?;
    wtr.write_record(ML_METRICS_HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    info!("Wrote {} metric rows to {}", rows.len(), path.display());
    Ok(())
}

/// Write the feature importance file, replacing any existing one.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created or a row
/// fails to serialize.
pub fn write_feature_importances(
    path: &Path,
    importances: &[FeatureImportance],
) -> Result<(), ExportError> {
    let mut wtr = writer_for(path)?;
    wtr.write_record(FEATURE_IMPORTANCES_HEADER)?;
    for importance in importances {
        wtr.serialize(importance)?;
    }
    wtr.flush()?;

    info!(
        "Wrote {} feature importances to {}",
        importances.len(),
        path.display()
    );
    Ok(())
}

/// Read a metrics file written by [`write_ml_metrics`].
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a row does not parse.
pub fn read_ml_metrics(path: &Path) -> Result<Vec<MetricRow>, ExportError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let rows = rdr.deserialize().collect::<Result<Vec<MetricRow>, _>>()?;
    Ok(rows)
}

/// Read a feature importance file written by [`write_feature_importances`].
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a row does not parse.
pub fn read_feature_importances(path: &Path) -> Result<Vec<FeatureImportance>, ExportError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let rows = rdr
        .deserialize()
        .collect::<Result<Vec<FeatureImportance>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_models::{LassoWindowMetrics, RegressionMetrics, WindowMetrics};

    fn window(year: i32, mse: f64, r2: f64) -> WindowMetrics {
        WindowMetrics::new(year, RegressionMetrics { mse, r2 }, 100, 20)
    }

    #[test]
    fn test_metric_rows_order_and_labels() {
        let linear = LinearModelResults {
            linear: vec![window(2022, 0.1, 0.2), window(2023, 0.3, 0.4)],
            lasso: vec![LassoWindowMetrics {
                alpha: 0.012_345,
                metrics: window(2022, 0.5, 0.6),
            }],
            skipped: Vec::new(),
        };
        let forest = ForestResults {
            windows: vec![window(2023, 0.7, 0.8)],
            ..Default::default()
        };

        let rows = metric_rows(&linear, &forest);
        let labels: Vec<&str> = rows.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "LinearRegression",
                "LinearRegression",
                "Lasso(alpha=0.012)",
                "RandomForest"
            ]
        );
        assert_eq!(rows[3].year, 2023);
        assert_eq!(rows[2].mse, 0.5);
    }

    #[test]
    fn test_metric_rows_empty() {
        let rows = metric_rows(&LinearModelResults::default(), &ForestResults::default());
        assert!(rows.is_empty());
    }
}
