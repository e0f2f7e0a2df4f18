#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/verdant/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod loader;
pub mod observation;
pub mod schema;

pub use error::{DataError, Result};
pub use loader::{DEFAULT_DATA_PATH, LoaderConfig, load_observations};
pub use observation::{CompleteObservation, LoadReport, Observation, ObservationTable};
pub use schema::{DEFAULT_FEATURES, DEFAULT_TARGET, DEFAULT_YEAR_COLUMN, ObservationSchema};

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
