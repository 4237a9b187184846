#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical record types for the agriculture and rainfall datasets.
//!
//! Every loader produces [`CropRecord`] and [`RainfallRecord`] rows that
//! conform to this schema, wrapped in a [`Dataset`] that also carries an
//! explicit load-failure signal. The query core only ever reads these
//! types; it never sees raw column names.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which of the two base datasets a value came from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatasetKind {
    /// Crop production by state, district, crop and year.
    Agriculture,
    /// Annual rainfall by climatological subdivision and year.
    Rainfall,
}

impl DatasetKind {
    /// Human-readable dataset label used in notices.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Agriculture => "Crop production dataset",
            Self::Rainfall => "Rainfall dataset",
        }
    }
}

/// One row of the agriculture dataset.
///
/// `(state, district, crop, year)` is not unique; aggregations sum over
/// duplicate rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRecord {
    /// State name, title-cased (e.g. "Tamil Nadu").
    pub state: String,
    /// District name, title-cased, when the source has district detail.
    pub district: Option<String>,
    /// Crop name, title-cased (e.g. "Rice").
    pub crop: String,
    /// Crop year.
    pub year: i32,
    /// Production in tonnes. `None` when the source value was missing or
    /// non-numeric.
    pub production: Option<f64>,
    /// Harvested area, if reported.
    pub area_harvested: Option<f64>,
}

/// One row of the rainfall dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RainfallRecord {
    /// Climatological subdivision, upper-cased (e.g. "COASTAL KARNATAKA").
    pub subdivision: String,
    /// Calendar year.
    pub year: i32,
    /// Annual rainfall in millimetres. `None` when missing or non-numeric.
    pub annual: Option<f64>,
}

/// A loaded dataset: its rows plus an optional load failure description.
///
/// A failed load is represented as an empty record list with
/// `load_error` set, never as a panic or a missing value, so that
/// downstream code keeps answering with "no data" results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset<T> {
    /// Which dataset this is.
    pub kind: DatasetKind,
    /// The canonical rows.
    pub records: Vec<T>,
    /// Why loading failed, if it did.
    pub load_error: Option<String>,
}

impl<T> Dataset<T> {
    /// Wraps successfully loaded records.
    #[must_use]
    pub const fn new(kind: DatasetKind, records: Vec<T>) -> Self {
        Self {
            kind,
            records,
            load_error: None,
        }
    }

    /// An empty dataset carrying the reason it could not be loaded.
    #[must_use]
    pub fn unavailable(kind: DatasetKind, error: impl Into<String>) -> Self {
        Self {
            kind,
            records: Vec::new(),
            load_error: Some(error.into()),
        }
    }

    /// Returns `true` if there are no rows (whether or not loading failed).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the loader reported a failure.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        self.load_error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_dataset_is_empty_with_error() {
        let ds: Dataset<CropRecord> =
            Dataset::unavailable(DatasetKind::Agriculture, "file not found");
        assert!(ds.is_empty());
        assert!(ds.is_unavailable());
        assert_eq!(ds.load_error.as_deref(), Some("file not found"));
    }

    #[test]
    fn dataset_kind_round_trips_through_strum() {
        assert_eq!(DatasetKind::Rainfall.to_string(), "rainfall");
        assert_eq!(
            "agriculture".parse::<DatasetKind>().unwrap(),
            DatasetKind::Agriculture
        );
    }
}
