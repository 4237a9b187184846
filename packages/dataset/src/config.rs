//! Where the dataset files live.
//!
//! Paths come from the `[datasets]` table of the application config, then
//! `SAMARTH_CROPS_PATH` / `SAMARTH_RAINFALL_PATH`, then explicit command
//! line flags, each layer overriding the one before.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`DatasetPaths::crops`].
pub const CROPS_PATH_ENV: &str = "SAMARTH_CROPS_PATH";

/// Environment variable overriding [`DatasetPaths::rainfall`].
pub const RAINFALL_PATH_ENV: &str = "SAMARTH_RAINFALL_PATH";

/// Locations of the two dataset files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetPaths {
    /// Crop production spreadsheet or CSV.
    pub crops: PathBuf,
    /// Rainfall CSV.
    pub rainfall: PathBuf,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self {
            crops: PathBuf::from("data/crop.xlsx"),
            rainfall: PathBuf::from("data/rainfall.csv"),
        }
    }
}

impl DatasetPaths {
    /// Applies the `SAMARTH_*_PATH` environment overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`, ignoring blank values.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = non_blank(CROPS_PATH_ENV) {
            log::debug!("{CROPS_PATH_ENV} overrides crop dataset path: {path}");
            self.crops = PathBuf::from(path);
        }
        if let Some(path) = non_blank(RAINFALL_PATH_ENV) {
            log::debug!("{RAINFALL_PATH_ENV} overrides rainfall dataset path: {path}");
            self.rainfall = PathBuf::from(path);
        }

        self
    }
}
