//! Serializable run configuration.
//!
//! A run is fully described by where the bars come from, where artifacts go,
//! and the pipeline parameters. The whole struct is hashed into a `RunId`, so
//! two runs with identical configuration share an id.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use squeezelab_core::PipelineConfig;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot render TOML: {0}")]
    Render(#[from] toml::ser::Error),
    #[error("cannot fingerprint config: {0}")]
    Fingerprint(#[from] serde_json::Error),
    #[error("pipeline: {0}")]
    Pipeline(#[from] squeezelab_core::ConfigError),
    #[error("input date range is empty: {start} > {end}")]
    EmptyDateRange { start: NaiveDate, end: NaiveDate },
}

/// Where raw bars come from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// CSV or Parquet file. Optional when bars are synthesized.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Instrument filter; empty keeps every instrument in the file.
    #[serde(default)]
    pub codes: Vec<String>,
    /// Inclusive date bounds applied after loading.
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl InputConfig {
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    pub fn wants_code(&self, code: &str) -> bool {
        self.codes.is_empty() || self.codes.iter().any(|c| c == code)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub input: InputConfig,
    pub pipeline: PipelineConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

impl RunConfig {
    pub fn new(input: InputConfig, pipeline: PipelineConfig) -> Self {
        Self {
            output_dir: default_output_dir(),
            input,
            pipeline,
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline.validate()?;
        if let (Some(start), Some(end)) = (self.input.start, self.input.end) {
            if start > end {
                return Err(ConfigError::EmptyDateRange { start, end });
            }
        }
        Ok(())
    }

    /// Deterministic hash of the canonical JSON form of this config.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}
