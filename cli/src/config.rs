//! Settings for the shelter-graph binary.
//!
//! Read from a TOML file given by `--config` or `SHELTER_GRAPH_CONFIG`;
//! every key is optional and falls back to the built-in default.
//!
//! ```toml
//! data_dir = "data"
//! shelters_file = "shelters.csv"
//! connections_file = "connections.csv"
//! default_year = 2024
//! min_year = 1900
//! max_year = 2100
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shelter_graph_core::Year;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("min_year {min} is greater than max_year {max}")]
    InvalidBounds { min: Year, max: Year },

    #[error("year {year} is outside the configured range {min}..={max}")]
    YearOutOfRange { year: Year, min: Year, max: Year },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory the record files are resolved against.
    pub data_dir: PathBuf,
    pub shelters_file: String,
    pub connections_file: String,
    /// Cutoff used when a command gets no `--year`.
    pub default_year: Year,
    pub min_year: Year,
    pub max_year: Year,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            shelters_file: "shelters.csv".to_string(),
            connections_file: "connections.csv".to_string(),
            default_year: 2024,
            min_year: 1900,
            max_year: 2100,
        }
    }
}

impl Config {
    /// Load from `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str(&text).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_year > self.max_year {
            return Err(ConfigError::InvalidBounds {
                min: self.min_year,
                max: self.max_year,
            });
        }
        self.check_year(self.default_year)?;
        Ok(())
    }

    /// Resolve the year for a command: explicit value or `default_year`,
    /// range-checked against `min_year..=max_year`.
    pub fn resolve_year(&self, year: Option<Year>) -> Result<Year, ConfigError> {
        self.check_year(year.unwrap_or(self.default_year))
    }

    pub fn check_year(&self, year: Year) -> Result<Year, ConfigError> {
        if year < self.min_year || year > self.max_year {
            return Err(ConfigError::YearOutOfRange {
                year,
                min: self.min_year,
                max: self.max_year,
            });
        }
        Ok(year)
    }

    pub fn shelters_path(&self) -> PathBuf {
        self.data_dir.join(&self.shelters_file)
    }

    pub fn connections_path(&self) -> PathBuf {
        self.data_dir.join(&self.connections_file)
    }
}
