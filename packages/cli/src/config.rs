//! `samarth.toml` application config.

use std::path::{Path, PathBuf};

use samarth_analytics_models::AnalyticsSettings;
use samarth_dataset::config::DatasetPaths;
use serde::Deserialize;
use thiserror::Error;

/// Config file read when `--config` is not given. It is optional.
pub const DEFAULT_CONFIG_PATH: &str = "samarth.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Top-level config file contents.
///
/// ```toml
/// [datasets]
/// crops = "data/crop.xlsx"
/// rainfall = "data/rainfall.csv"
///
/// [analytics]
/// national_average_fallback = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub datasets: DatasetPaths,
    pub analytics: AnalyticsSettings,
}

impl AppConfig {
    /// Reads `explicit`, or [`DEFAULT_CONFIG_PATH`] when it exists.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::Io`] if an explicitly named file cannot be read
    /// * [`ConfigError::Toml`] if the file is not valid config TOML
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));

        match std::fs::read_to_string(path) {
            Ok(contents) => {
                log::debug!("Reading config from {}", path.display());
                Self::parse(&contents)
            }
            Err(e) if explicit.is_none() && e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No {DEFAULT_CONFIG_PATH} found, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parses config TOML. Missing tables and keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on malformed TOML or mistyped values.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = AppConfig::parse(
            r#"
[datasets]
crops = "/data/apy.csv"
rainfall = "/data/imd.csv"

[analytics]
national_average_fallback = true
"#,
        )
        .unwrap();

        assert_eq!(config.datasets.crops, PathBuf::from("/data/apy.csv"));
        assert_eq!(config.datasets.rainfall, PathBuf::from("/data/imd.csv"));
        assert!(config.analytics.national_average_fallback);
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config = AppConfig::parse("[datasets]\ncrops = \"crops.csv\"\n").unwrap();
        assert_eq!(config.datasets.crops, PathBuf::from("crops.csv"));
        assert_eq!(config.datasets.rainfall, DatasetPaths::default().rainfall);
        assert!(!config.analytics.national_average_fallback);
        assert_eq!(AppConfig::parse("").unwrap(), AppConfig::default());
    }

    #[test]
    fn rejects_mistyped_values() {
        assert!(AppConfig::parse("[analytics]\nnational_average_fallback = \"yes\"\n").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/samarth.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
