#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loading of the crop production and rainfall files (CSV or spreadsheet).
//!
//! Raw files name their columns inconsistently ("State_Name",
//! "Crop_Year", "SUBDIVISION", "ANNUAL", ...). [`schema`] maps those
//! headers onto canonical fields, [`load`] parses rows into
//! [`samarth_dataset_models::CropRecord`] and
//! [`samarth_dataset_models::RainfallRecord`] with canonical casing, and
//! [`config`] resolves where the files live.
//!
//! The top-level loaders never fail: a file that cannot be read becomes an
//! empty [`samarth_dataset_models::Dataset`] carrying the error message, so
//! queries can still run against the other dataset.

pub mod config;
pub mod load;
pub mod progress;
pub mod schema;

pub use load::{
    crops_from_sheet, load_crops, load_rainfall, rainfall_from_sheet, read_crops, read_rainfall,
};

use samarth_dataset_models::DatasetKind;
use thiserror::Error;

/// Errors that can occur while reading a dataset file.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV header row could not be read, or the reader failed.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// The spreadsheet could not be opened or its sheet could not be read.
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// The spreadsheet contains no worksheets.
    #[error("spreadsheet has no worksheets")]
    EmptyWorkbook,

    /// No header maps onto a column the dataset cannot do without.
    #[error("{kind} file has no column for '{column}'")]
    MissingColumn {
        /// Which dataset was being read.
        kind: DatasetKind,
        /// Canonical name of the missing column.
        column: String,
    },
}
