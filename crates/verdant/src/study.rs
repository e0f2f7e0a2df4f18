//! End-to-end study: load, fit both model families, write results.

use crate::config::StudyConfig;
use crate::error::StudyError;
use log::info;
use std::path::PathBuf;
use verdant_data::{LoadReport, ObservationTable, load_observations};
use verdant_models::{
    FeatureImportance, ForestResults, LinearModelResults, run_linear_models, run_random_forest,
};
use verdant_output::{MetricRow, metric_rows, write_feature_importances, write_ml_metrics};

/// What was written at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyOutputs {
    /// Path of the metrics file
    pub metrics_path: PathBuf,
    /// Path of the feature importance file
    pub importances_path: PathBuf,
    /// Rows written to the metrics file
    pub metric_rows: Vec<MetricRow>,
    /// Rows written to the feature importance file
    pub feature_importances: Vec<FeatureImportance>,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyReport {
    /// Counts from loading the dataset
    pub load: LoadReport,
    /// Linear and Lasso results
    pub linear: LinearModelResults,
    /// Random forest results
    pub forest: ForestResults,
    /// Files written
    pub outputs: StudyOutputs,
}

/// A validated study, run step by step or all at once with [`Study::run`].
#[derive(Debug, Clone)]
pub struct Study {
    config: StudyConfig,
}

impl Study {
    /// Validate `config` and prepare a study.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: StudyConfig) -> Result<Self, StudyError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this study runs with.
    pub const fn config(&self) -> &StudyConfig {
        &self.config
    }

    /// Load the observation table.
    ///
    /// # Errors
    /// Returns an error if the dataset is missing or malformed.
    pub fn load(&self) -> Result<ObservationTable, StudyError> {
        Ok(load_observations(&self.config.loader, &self.config.schema)?)
    }

    /// Fit linear regression and cross-validated Lasso on every window.
    ///
    /// # Errors
    /// Returns an error if any fit fails.
    pub fn run_linear(&self, table: &ObservationTable) -> Result<LinearModelResults, StudyError> {
        Ok(run_linear_models(
            table,
            &self.config.test_years,
            &self.config.lasso,
        )?)
    }

    /// Fit the random forest on every window.
    ///
    /// # Errors
    /// Returns an error if any fit fails.
    pub fn run_forest(&self, table: &ObservationTable) -> Result<ForestResults, StudyError> {
        Ok(run_random_forest(
            table,
            &self.config.test_years,
            &self.config.forest,
        )?)
    }

    /// Write both result files.
    ///
    /// # Errors
    /// Returns an error if a file cannot be written.
    pub fn write(
        &self,
        linear: &LinearModelResults,
        forest: &ForestResults,
    ) -> Result<StudyOutputs, StudyError> {
        let metrics_path = self.config.output.metrics_path();
        let importances_path = self.config.output.importances_path();

        let rows = metric_rows(linear, forest);
        write_ml_metrics(&metrics_path, &rows)?;
        write_feature_importances(&importances_path, &forest.feature_importances)?;

        Ok(StudyOutputs {
            metrics_path,
            importances_path,
            metric_rows: rows,
            feature_importances: forest.feature_importances.clone(),
        })
    }

    /// Run every step. Nothing is written unless both model families succeed.
    ///
    /// # Errors
    /// Returns the first error from any step.
    pub fn run(&self) -> Result<StudyReport, StudyError> {
        let table = self.load()?;
        let linear = self.run_linear(&table)?;
        let forest = self.run_forest(&table)?;
        let outputs = self.write(&linear, &forest)?;

        info!(
            "Study finished: {} metric rows, {} skipped windows",
            outputs.metric_rows.len(),
            linear.skipped.len() + forest.skipped.len()
        );

        Ok(StudyReport {
            load: table.report(),
            linear,
            forest,
            outputs,
        })
    }
}

/// Validate `config` and run the whole study.
///
/// # Errors
/// Returns the first error from validation, loading, fitting or writing.
pub fn run_study(config: &StudyConfig) -> Result<StudyReport, StudyError> {
    Study::new(config.clone())?.run()
}
