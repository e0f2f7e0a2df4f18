//! Typed observation records
//!
//! One [`Observation`] per (entity, year) row of the panel. Predictor and
//! target cells keep their missingness; [`Observation::complete`] is the single
//! place where the drop-if-any-field-missing rule is applied.

use crate::schema::ObservationSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single company-year row as read from the input table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation year
    pub year: i32,
    /// Target value, `None` when the cell was empty
    pub target: Option<f64>,
    /// Predictor values in schema order, `None` when the cell was empty
    pub features: Vec<Option<f64>>,
}

impl Observation {
    /// Create a new observation.
    pub const fn new(year: i32, target: Option<f64>, features: Vec<Option<f64>>) -> Self {
        Self {
            year,
            target,
            features,
        }
    }

    /// Whether the target and every predictor are present.
    ///
    /// NaN cells count as missing.
    pub fn is_complete(&self) -> bool {
        self.target.is_some_and(|t| !t.is_nan())
            && self.features.iter().all(|f| f.is_some_and(|v| !v.is_nan()))
    }

    /// Return the row with all fields unwrapped, or `None` if any is missing.
    pub fn complete(&self) -> Option<CompleteObservation> {
        if !self.is_complete() {
            return None;
        }
        Some(CompleteObservation {
            year: self.year,
            target: self.target?,
            features: self.features.iter().copied().collect::<Option<Vec<f64>>>()?,
        })
    }
}

/// A row with no missing required fields, ready for model fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteObservation {
    /// Observation year
    pub year: i32,
    /// Target value
    pub target: f64,
    /// Predictor values in schema order
    pub features: Vec<f64>,
}

/// Shape of the source file as read, before any rows were set aside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Data rows in the file (header excluded)
    pub rows_read: usize,
    /// Columns in the file
    pub columns_read: usize,
    /// Rows dropped because the year cell was empty
    pub rows_without_year: usize,
}

/// Validated, read-only observation table.
#[derive(Debug, Clone)]
pub struct ObservationTable {
    schema: ObservationSchema,
    observations: Vec<Observation>,
    report: LoadReport,
}

impl ObservationTable {
    /// Build a table from already-typed observations.
    ///
    /// The load report describes the observations themselves: one row each and
    /// one column per schema field.
    pub fn from_observations(schema: ObservationSchema, observations: Vec<Observation>) -> Self {
        let report = LoadReport {
            rows_read: observations.len(),
            columns_read: schema.required_columns().len(),
            rows_without_year: 0,
        };
        Self::with_report(schema, observations, report)
    }

    pub(crate) const fn with_report(
        schema: ObservationSchema,
        observations: Vec<Observation>,
        report: LoadReport,
    ) -> Self {
        Self {
            schema,
            observations,
            report,
        }
    }

    /// Schema the table was validated against.
    pub const fn schema(&self) -> &ObservationSchema {
        &self.schema
    }

    /// All retained observations in file order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Load statistics.
    pub const fn report(&self) -> LoadReport {
        self.report
    }

    /// Number of data rows in the source file.
    pub const fn row_count(&self) -> usize {
        self.report.rows_read
    }

    /// Number of columns in the source file.
    pub const fn column_count(&self) -> usize {
        self.report.columns_read
    }

    /// Number of retained observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether no observations were retained.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Earliest year present.
    pub fn min_year(&self) -> Option<i32> {
        self.observations.iter().map(|o| o.year).min()
    }

    /// Latest year present.
    pub fn max_year(&self) -> Option<i32> {
        self.observations.iter().map(|o| o.year).max()
    }

    /// Distinct years in ascending order.
    pub fn years(&self) -> Vec<i32> {
        self.observations
            .iter()
            .map(|o| o.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ObservationSchema {
        ObservationSchema::new("Year", "y", ["a", "b"])
    }

    #[test]
    fn test_complete_observation() {
        let obs = Observation::new(2020, Some(0.1), vec![Some(1.0), Some(2.0)]);
        let complete = obs.complete().unwrap();
        assert_eq!(complete.year, 2020);
        assert_eq!(complete.target, 0.1);
        assert_eq!(complete.features, vec![1.0, 2.0]);
    }

    #[test]
    fn test_missing_feature_is_incomplete() {
        let obs = Observation::new(2020, Some(0.1), vec![Some(1.0), None]);
        assert!(!obs.is_complete());
        assert!(obs.complete().is_none());
    }

    #[test]
    fn test_missing_target_is_incomplete() {
        let obs = Observation::new(2020, None, vec![Some(1.0), Some(2.0)]);
        assert!(obs.complete().is_none());
    }

    #[test]
    fn test_nan_is_incomplete() {
        let obs = Observation::new(2020, Some(f64::NAN), vec![Some(1.0), Some(2.0)]);
        assert!(obs.complete().is_none());
    }

    #[test]
    fn test_table_years() {
        let table = ObservationTable::from_observations(
            schema(),
            vec![
                Observation::new(2021, Some(0.0), vec![Some(0.0), Some(0.0)]),
                Observation::new(2019, Some(0.0), vec![Some(0.0), Some(0.0)]),
                Observation::new(2021, Some(0.0), vec![Some(0.0), Some(0.0)]),
            ],
        );

        assert_eq!(table.len(), 3);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 4);
        assert_eq!(table.min_year(), Some(2019));
        assert_eq!(table.max_year(), Some(2021));
        assert_eq!(table.years(), vec![2019, 2021]);
    }

    #[test]
    fn test_empty_table() {
        let table = ObservationTable::from_observations(schema(), Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.min_year(), None);
    }
}
