#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/verdant/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod design;
pub mod error;
pub mod forest;
pub mod lasso_cv;
pub mod linear;
pub mod metrics;
pub mod regressor;
pub mod window;

// Re-export main types
pub use design::{DesignMatrix, StandardScaler};
pub use error::ModelError;
pub use forest::{
    FeatureImportance, ForestConfig, ForestModel, ForestResults, aggregate_importances,
    run_random_forest,
};
pub use lasso_cv::{LassoCv, LassoCvConfig, LassoCvFit, LassoModel, alpha_grid, kfold_splits};
pub use linear::{LassoWindowMetrics, LinearModel, LinearModelResults, run_linear_models};
pub use metrics::{RegressionMetrics, WindowMetrics};
pub use regressor::Regressor;
pub use window::{
    DEFAULT_TEST_YEARS, ExpandingWindows, SkipReason, SkippedWindow, Window, WindowIter,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
