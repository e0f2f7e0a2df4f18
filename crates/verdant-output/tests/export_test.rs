//! Round-trip tests for the CSV writers.

use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use verdant_models::{
    FeatureImportance, ForestResults, LassoWindowMetrics, LinearModelResults, RegressionMetrics,
    WindowMetrics,
};
use verdant_output::{
    metric_rows, read_feature_importances, read_ml_metrics, write_feature_importances,
    write_ml_metrics,
};

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("verdant_output_{}_{}", name, std::process::id()))
}

fn window(year: i32) -> WindowMetrics {
    WindowMetrics::new(
        year,
        RegressionMetrics {
            mse: 0.01 * f64::from(year - 2020),
            r2: -0.05,
        },
        200,
        50,
    )
}

#[rstest]
#[case::two_windows(&[2022, 2023])]
#[case::one_window(&[2023])]
#[case::no_windows(&[])]
fn test_metrics_round_trip(#[case] years: &[i32]) {
    let linear = LinearModelResults {
        linear: years.iter().map(|&y| window(y)).collect(),
        lasso: years
            .iter()
            .map(|&y| LassoWindowMetrics {
                alpha: 0.0042,
                metrics: window(y),
            })
            .collect(),
        skipped: Vec::new(),
    };
    let forest = ForestResults {
        windows: years.iter().map(|&y| window(y)).collect(),
        ..Default::default()
    };
    let rows = metric_rows(&linear, &forest);

    let dir = scratch_dir(&format!("metrics_{}", years.len()));
    let path = dir.join("nested").join("ml_metrics.csv");
    write_ml_metrics(&path, &rows).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().next(), Some("model,year,mse,r2"));

    let read_back = read_ml_metrics(&path).unwrap();
    assert_eq!(read_back.len(), 3 * years.len());
    assert_eq!(read_back, rows);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_importances_round_trip() {
    let importances = vec![
        FeatureImportance {
            feature: "Momentum_1y_w".to_string(),
            importance: 0.55,
        },
        FeatureImportance {
            feature: "Debt-to-Equity_w".to_string(),
            importance: 0.45,
        },
    ];

    let dir = scratch_dir("importances");
    let path = dir.join("feature_importances.csv");
    write_feature_importances(&path, &importances).unwrap();

    let read_back = read_feature_importances(&path).unwrap();
    assert_eq!(read_back, importances);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_empty_importances_still_have_header() {
    let dir = scratch_dir("empty_importances");
    let path = dir.join("feature_importances.csv");
    write_feature_importances(&path, &[]).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.trim_end(), "feature,importance");
    assert!(read_feature_importances(&path).unwrap().is_empty());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_existing_file_is_overwritten() {
    let dir = scratch_dir("overwrite");
    let path = dir.join("ml_metrics.csv");
    fs::create_dir_all(&dir).unwrap();
    fs::write(&path, "stale,content\n1,2\n3,4\n").unwrap();

    write_ml_metrics(&path, &[]).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "model,year,mse,r2\n");

    fs::remove_dir_all(&dir).ok();
}
