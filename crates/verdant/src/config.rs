//! Study configuration.
//!
//! Defaults reproduce the reference study: semicolon-delimited input at
//! `data/main_dataset.csv`, test years 2022 and 2023, five-fold LassoCV and a
//! 300-tree forest seeded with 42. A JSON file may override any subset of
//! fields; missing keys keep their defaults.

use crate::error::StudyError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use verdant_data::{LoaderConfig, ObservationSchema};
use verdant_models::{DEFAULT_TEST_YEARS, ForestConfig, LassoCvConfig};

/// Where results are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory (default: `results`)
    pub results_dir: PathBuf,
    /// Metrics file name (default: `ml_metrics.csv`)
    pub metrics_file: String,
    /// Feature importance file name (default: `feature_importances.csv`)
    pub importances_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            metrics_file: "ml_metrics.csv".to_string(),
            importances_file: "feature_importances.csv".to_string(),
        }
    }
}

impl OutputConfig {
    /// Full path of the metrics file.
    pub fn metrics_path(&self) -> PathBuf {
        self.results_dir.join(&self.metrics_file)
    }

    /// Full path of the feature importance file.
    pub fn importances_path(&self) -> PathBuf {
        self.results_dir.join(&self.importances_file)
    }
}

/// Everything a study run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Input file options
    pub loader: LoaderConfig,
    /// Column roles
    pub schema: ObservationSchema,
    /// Years evaluated out of sample, in order
    pub test_years: Vec<i32>,
    /// Cross-validated Lasso options
    pub lasso: LassoCvConfig,
    /// Random forest options
    pub forest: ForestConfig,
    /// Output locations
    pub output: OutputConfig,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            schema: ObservationSchema::default(),
            test_years: DEFAULT_TEST_YEARS.to_vec(),
            lasso: LassoCvConfig::default(),
            forest: ForestConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl StudyConfig {
    /// Read a JSON configuration, filling absent fields with defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON for
    /// this structure.
    pub fn from_json_file(path: &Path) -> Result<Self, StudyError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Check that the configuration describes a runnable study.
    ///
    /// # Errors
    /// Returns the first problem found: an invalid schema, no test years,
    /// duplicate test years, or out-of-range model parameters.
    pub fn validate(&self) -> Result<(), StudyError> {
        self.schema.validate()?;

        if self.test_years.is_empty() {
            return Err(StudyError::InvalidConfig(
                "at least one test year is required".into(),
            ));
        }
        let mut years = self.test_years.clone();
        years.sort_unstable();
        years.dedup();
        if years.len() != self.test_years.len() {
            return Err(StudyError::InvalidConfig(format!(
                "test years must be distinct, got {:?}",
                self.test_years
            )));
        }

        self.lasso.validate()?;
        self.forest.validate()?;

        if self.output.metrics_file.is_empty() || self.output.importances_file.is_empty() {
            return Err(StudyError::InvalidConfig(
                "output file names must not be empty".into(),
            ));
        }
        Ok(())
    }
}
