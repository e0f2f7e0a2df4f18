#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/verdant/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod study;

// Re-export main types from sub-crates
pub use verdant_data as data;
pub use verdant_models as models;
pub use verdant_output as output;

pub use config::{OutputConfig, StudyConfig};
pub use error::StudyError;
pub use study::{Study, StudyOutputs, StudyReport, run_study};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
