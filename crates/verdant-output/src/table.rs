//! Fixed-width console tables.

use crate::export::MetricRow;
use verdant_models::FeatureImportance;

const WIDTH: usize = 64;

/// Render metric rows as a text table.
pub fn format_metrics_table(rows: &[MetricRow]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<24} {:>6} {:>16} {:>14}\n",
        "Model", "Year", "MSE", "R2"
    ));
    output.push_str(&"-".repeat(WIDTH));
    output.push('\n');

    for row in rows {
        output.push_str(&format!(
            "{:<24} {:>6} {:>16.6} {:>14.4}\n",
            row.model, row.year, row.mse, row.r2
        ));
    }

    if rows.is_empty() {
        output.push_str("(no windows evaluated)\n");
    }

    output
}

/// Render feature importances as a text table, in the order given.
pub fn format_importances_table(importances: &[FeatureImportance]) -> String {
    let mut output = String::new();

    output.push_str(&format!("{:<24} {:>12}\n", "Feature", "Importance"));
    output.push_str(&"-".repeat(37));
    output.push('\n');

    for item in importances {
        output.push_str(&format!("{:<24} {:>12.6}\n", item.feature, item.importance));
    }

    if importances.is_empty() {
        output.push_str("(no importances)\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_table_lines() {
        let rows = vec![
            MetricRow::new("LinearRegression", 2022, 0.012_345_6, 0.05),
            MetricRow::new("Lasso(alpha=0.010)", 2022, 0.011, -0.02),
        ];
        let table = format_metrics_table(&rows);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Model"));
        assert!(lines[2].contains("LinearRegression"));
        assert!(lines[2].contains("0.012346"));
        assert!(lines[3].contains("-0.0200"));
    }

    #[test]
    fn test_empty_tables() {
        assert!(format_metrics_table(&[]).contains("no windows"));
        assert!(format_importances_table(&[]).contains("no importances"));
    }

    #[test]
    fn test_importances_keep_order() {
        let importances = vec![
            FeatureImportance {
                feature: "Size".to_string(),
                importance: 0.6,
            },
            FeatureImportance {
                feature: "Beta_Value".to_string(),
                importance: 0.4,
            },
        ];
        let table = format_importances_table(&importances);
        let size = table.find("Size").unwrap();
        let beta = table.find("Beta_Value").unwrap();
        assert!(size < beta);
    }
}
