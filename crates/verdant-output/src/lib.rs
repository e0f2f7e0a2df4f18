#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/verdant/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod table;

pub use export::{
    ExportError, FEATURE_IMPORTANCES_HEADER, MetricRow, ML_METRICS_HEADER, metric_rows,
    read_feature_importances, read_ml_metrics, write_feature_importances, write_ml_metrics,
};
pub use table::{format_importances_table, format_metrics_table};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
