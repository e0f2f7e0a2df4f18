//! Expanding-window train/test splits keyed by year.
//!
//! For each requested test year the training slice is every row from the
//! first year in the table up to (not including) the test year, and the
//! testing slice is exactly the test year's rows. Rows with any missing
//! required field are dropped from each slice independently.
//!
//! A year whose training or testing slice ends up empty is not yielded. The
//! omission is logged and recorded as a [`SkippedWindow`] so callers can report
//! it next to the metrics.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use verdant_data::{CompleteObservation, ObservationTable};

/// Default out-of-sample years.
pub const DEFAULT_TEST_YEARS: [i32; 2] = [2022, 2023];

/// One train/test split.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// Year evaluated out of sample
    pub test_year: i32,
    /// Complete rows strictly before `test_year`
    pub train: Vec<CompleteObservation>,
    /// Complete rows of `test_year`
    pub test: Vec<CompleteObservation>,
}

impl Window {
    /// First and last year covered by the training slice.
    pub fn train_years(&self) -> Option<(i32, i32)> {
        let first = self.train.iter().map(|o| o.year).min()?;
        let last = self.train.iter().map(|o| o.year).max()?;
        Some((first, last))
    }
}

/// Why a requested year produced no window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// No complete rows before the test year
    EmptyTraining {
        /// Rows in the slice before the missing-value drop
        rows_before_drop: usize,
    },
    /// No complete rows in the test year
    EmptyTesting {
        /// Rows in the slice before the missing-value drop
        rows_before_drop: usize,
    },
}

/// A requested test year that was omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedWindow {
    /// The omitted test year
    pub test_year: i32,
    /// Which slice was empty
    pub reason: SkipReason,
}

impl fmt::Display for SkippedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            SkipReason::EmptyTraining { rows_before_drop } => write!(
                f,
                "test year {} skipped: no complete training rows ({} before dropping missing values)",
                self.test_year, rows_before_drop
            ),
            SkipReason::EmptyTesting { rows_before_drop } => write!(
                f,
                "test year {} skipped: no complete testing rows ({} before dropping missing values)",
                self.test_year, rows_before_drop
            ),
        }
    }
}

/// Expanding-window split plan over an observation table.
///
/// The plan is cheap to hold; every call to [`ExpandingWindows::iter`] starts
/// a fresh lazy pass over the test years.
#[derive(Debug, Clone)]
pub struct ExpandingWindows<'a> {
    table: &'a ObservationTable,
    test_years: Vec<i32>,
}

impl<'a> ExpandingWindows<'a> {
    /// Plan windows for `test_years`, in the given order.
    pub fn new(table: &'a ObservationTable, test_years: &[i32]) -> Self {
        Self {
            table,
            test_years: test_years.to_vec(),
        }
    }

    /// Requested test years.
    pub fn test_years(&self) -> &[i32] {
        &self.test_years
    }

    /// Start a new pass over the windows.
    pub fn iter(&self) -> WindowIter<'_> {
        WindowIter {
            table: self.table,
            min_year: self.table.min_year(),
            test_years: self.test_years.iter(),
            skipped: Vec::new(),
        }
    }

    /// Materialize every window along with the skipped years.
    pub fn collect_all(&self) -> (Vec<Window>, Vec<SkippedWindow>) {
        let mut iter = self.iter();
        let windows: Vec<Window> = iter.by_ref().collect();
        (windows, iter.into_skipped())
    }
}

impl<'s, 'a> IntoIterator for &'s ExpandingWindows<'a> {
    type Item = Window;
    type IntoIter = WindowIter<'s>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over the windows of an [`ExpandingWindows`] plan.
#[derive(Debug)]
pub struct WindowIter<'a> {
    table: &'a ObservationTable,
    min_year: Option<i32>,
    test_years: std::slice::Iter<'a, i32>,
    skipped: Vec<SkippedWindow>,
}

impl WindowIter<'_> {
    /// Years skipped so far in this pass.
    pub fn skipped(&self) -> &[SkippedWindow] {
        &self.skipped
    }

    /// Consume the iterator, returning the years skipped so far.
    pub fn into_skipped(self) -> Vec<SkippedWindow> {
        self.skipped
    }

    fn build(&self, test_year: i32) -> Result<Window, SkippedWindow> {
        let min_year = self.min_year.unwrap_or(test_year);
        let observations = self.table.observations();

        let train_raw: Vec<_> = observations
            .iter()
            .filter(|o| o.year >= min_year && o.year < test_year)
            .collect();
        let test_raw: Vec<_> = observations
            .iter()
            .filter(|o| o.year == test_year)
            .collect();

        let train: Vec<CompleteObservation> = train_raw.iter().filter_map(|o| o.complete()).collect();
        let test: Vec<CompleteObservation> = test_raw.iter().filter_map(|o| o.complete()).collect();

        if train.is_empty() {
            return Err(SkippedWindow {
                test_year,
                reason: SkipReason::EmptyTraining {
                    rows_before_drop: train_raw.len(),
                },
            });
        }
        if test.is_empty() {
            return Err(SkippedWindow {
                test_year,
                reason: SkipReason::EmptyTesting {
                    rows_before_drop: test_raw.len(),
                },
            });
        }

        debug!(
            "Window {}: {} training rows ({} dropped), {} testing rows ({} dropped)",
            test_year,
            train.len(),
            train_raw.len() - train.len(),
            test.len(),
            test_raw.len() - test.len()
        );

        Ok(Window {
            test_year,
            train,
            test,
        })
    }
}

impl Iterator for WindowIter<'_> {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        loop {
            let test_year = *self.test_years.next()?;
            match self.build(test_year) {
                Ok(window) => return Some(window),
                Err(skipped) => {
                    warn!("{skipped}");
                    self.skipped.push(skipped);
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.test_years.len()))
    }
}
