//! Dataset loader
//!
//! Reads the delimited panel file with polars and converts it into an
//! [`ObservationTable`]. All schema checks happen here, once: required columns
//! must exist, the year column must be integral and the target and predictors
//! must be numeric. Nothing downstream touches the raw frame.

use crate::error::{DataError, Result};
use crate::observation::{LoadReport, Observation, ObservationTable};
use crate::schema::ObservationSchema;
use log::{info, warn};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the input panel.
pub const DEFAULT_DATA_PATH: &str = "data/main_dataset.csv";

/// Where and how to read the input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Path to the delimited file
    pub path: PathBuf,
    /// Field delimiter (default: `;`)
    pub delimiter: char,
    /// Parse `1,5` as 1.5 (default: false)
    pub decimal_comma: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATA_PATH),
            delimiter: ';',
            decimal_comma: false,
        }
    }
}

impl LoaderConfig {
    /// Default options reading from `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    fn separator(&self) -> Result<u8> {
        let separator = u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                DataError::Config(format!(
                    "delimiter '{}' must be a single ASCII character",
                    self.delimiter
                ))
            })?;
        if self.decimal_comma && separator == b',' {
            return Err(DataError::Config(
                "decimal_comma cannot be combined with a ',' delimiter".into(),
            ));
        }
        Ok(separator)
    }
}

/// Load and validate the observation table.
///
/// Rows whose year cell is empty are set aside (they cannot belong to any
/// window) and counted in [`LoadReport::rows_without_year`].
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, a required column
/// is missing, or a required column is not numeric.
pub fn load_observations(config: &LoaderConfig, schema: &ObservationSchema) -> Result<ObservationTable> {
    schema.validate()?;
    let frame = read_frame(&config.path, config)?;
    let table = frame_to_table(&frame, schema)?;

    info!(
        "Successfully loaded {} rows and {} columns from {}",
        table.row_count(),
        table.column_count(),
        config.path.display()
    );

    Ok(table)
}

fn read_frame(path: &Path, config: &LoaderConfig) -> Result<DataFrame> {
    let separator = config.separator()?;
    if !path.is_file() {
        return Err(DataError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("dataset not found: {}", path.display()),
        )));
    }

    let decimal_comma = config.decimal_comma;
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .map_parse_options(|opts| {
            opts.with_separator(separator)
                .with_decimal_comma(decimal_comma)
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    Ok(frame)
}

/// Convert a parsed frame into typed observations.
fn frame_to_table(frame: &DataFrame, schema: &ObservationSchema) -> Result<ObservationTable> {
    let present: Vec<&str> = frame
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .collect();
    let missing: Vec<String> = schema
        .required_columns()
        .into_iter()
        .filter(|name| !present.contains(name))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(DataError::MissingColumns(missing));
    }

    let years = year_column(frame, &schema.year_column)?;
    let target = float_column(frame, &schema.target)?;
    let features = schema
        .features
        .iter()
        .map(|name| float_column(frame, name))
        .collect::<Result<Vec<_>>>()?;

    let mut observations = Vec::with_capacity(frame.height());
    let mut rows_without_year = 0;
    for (row, year) in years.into_iter().enumerate() {
        let Some(year) = year else {
            rows_without_year += 1;
            continue;
        };
        observations.push(Observation::new(
            year,
            target[row],
            features.iter().map(|column| column[row]).collect(),
        ));
    }

    if rows_without_year > 0 {
        warn!(
            "Dropped {} rows with an empty '{}' cell",
            rows_without_year, schema.year_column
        );
    }

    let report = LoadReport {
        rows_read: frame.height(),
        columns_read: frame.width(),
        rows_without_year,
    };

    Ok(ObservationTable::with_report(schema.clone(), observations, report))
}

fn year_column(frame: &DataFrame, name: &str) -> Result<Vec<Option<i32>>> {
    let column = frame
        .column(name)?
        .strict_cast(&DataType::Int32)
        .map_err(|e| invalid_type(name, &e))?;
    Ok(column.i32()?.into_iter().collect())
}

fn float_column(frame: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = frame
        .column(name)?
        .strict_cast(&DataType::Float64)
        .map_err(|e| invalid_type(name, &e))?;
    Ok(column.f64()?.into_iter().collect())
}

fn invalid_type(column: &str, err: &PolarsError) -> DataError {
    DataError::InvalidColumnType {
        column: column.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_config_default() {
        let config = LoaderConfig::default();
        assert_eq!(config.path, PathBuf::from("data/main_dataset.csv"));
        assert_eq!(config.delimiter, ';');
        assert!(!config.decimal_comma);
        assert_eq!(config.separator().unwrap(), b';');
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let config = LoaderConfig {
            delimiter: '§',
            ..Default::default()
        };
        assert!(matches!(config.separator(), Err(DataError::Config(_))));
    }

    #[test]
    fn test_decimal_comma_conflicts_with_comma_delimiter() {
        let config = LoaderConfig {
            delimiter: ',',
            decimal_comma: true,
            ..Default::default()
        };
        assert!(config.separator().is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let config = LoaderConfig::with_path("definitely/not/here.csv");
        let result = load_observations(&config, &ObservationSchema::default());
        assert!(matches!(result, Err(DataError::Io(_))));
    }

    #[test]
    fn test_frame_to_table_reports_missing_columns() {
        let frame = df!(
            "Year" => [2020, 2021],
            "a" => [1.0, 2.0],
        )
        .unwrap();
        let schema = ObservationSchema::new("Year", "y", ["a", "b"]);

        match frame_to_table(&frame, &schema) {
            Err(DataError::MissingColumns(cols)) => assert_eq!(cols, vec!["b", "y"]),
            other => panic!("expected missing columns, got {other:?}"),
        }
    }

    #[test]
    fn test_frame_to_table_keeps_nulls() {
        let frame = df!(
            "Year" => [Some(2020), None, Some(2021)],
            "a" => [Some(1.0), Some(2.0), None],
            "y" => [Some(0.5), Some(0.1), Some(0.2)],
        )
        .unwrap();
        let schema = ObservationSchema::new("Year", "y", ["a"]);

        let table = frame_to_table(&frame, &schema).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.len(), 2);
        assert_eq!(table.report().rows_without_year, 1);
        assert_eq!(table.observations()[1].features, vec![None]);
    }
}
