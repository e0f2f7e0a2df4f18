//! Observation schema
//!
//! Names the columns the study reads from the panel: one integer year column,
//! one numeric target and an ordered list of numeric predictors. The schema is
//! checked once at load time so later stages work on typed records.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};

/// Default year column.
pub const DEFAULT_YEAR_COLUMN: &str = "Year";

/// Default prediction target: next year's winsorized return.
pub const DEFAULT_TARGET: &str = "Next_Year_Return_w";

/// Default predictors, in model column order.
pub const DEFAULT_FEATURES: [&str; 9] = [
    "ESG Global Score",
    "Size",
    "Momentum_1y_w",
    "Beta_Value",
    "ROE_Value_w",
    "PE_Ratio_w",
    "Debt-to-Equity_w",
    "ESG_x_Sector",
    "High_Impact_ESG",
];

/// Column layout required from the input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationSchema {
    /// Column holding the observation year
    pub year_column: String,
    /// Column holding the regression target
    pub target: String,
    /// Predictor columns (order defines feature indices)
    pub features: Vec<String>,
}

impl Default for ObservationSchema {
    fn default() -> Self {
        Self {
            year_column: DEFAULT_YEAR_COLUMN.to_string(),
            target: DEFAULT_TARGET.to_string(),
            features: DEFAULT_FEATURES.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}

impl ObservationSchema {
    /// Create a schema from explicit column names.
    pub fn new(
        year_column: impl Into<String>,
        target: impl Into<String>,
        features: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            year_column: year_column.into(),
            target: target.into(),
            features: features.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of predictors.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Every column the loader must find, year first.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = Vec::with_capacity(self.features.len() + 2);
        columns.push(self.year_column.as_str());
        columns.extend(self.features.iter().map(String::as_str));
        columns.push(self.target.as_str());
        columns
    }

    /// Reject empty or duplicated column assignments.
    ///
    /// # Errors
    /// Returns [`DataError::Config`] when no predictors are configured or a
    /// column name is used twice.
    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(DataError::Config("at least one feature is required".into()));
        }

        let columns = self.required_columns();
        for (i, name) in columns.iter().enumerate() {
            if name.is_empty() {
                return Err(DataError::Config("column names must not be empty".into()));
            }
            if columns[..i].contains(name) {
                return Err(DataError::Config(format!("column '{name}' is used twice")));
            }
        }

        Ok(())
    }
}
