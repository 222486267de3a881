//! Option file loading
//!
//! The option file only tunes how a batch runs. Input and output roots are
//! always given on the command line.

use serde::{Deserialize, Serialize};
use spectrum_ofl_batch::driver::default_jobs;
use spectrum_ofl_batch::BatchConfig;
use spectrum_ofl_core::ConvertOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub batch: BatchSection,
    #[serde(default)]
    pub convert: ConvertOptions,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSection {
    /// Fixtures converted concurrently
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Stop at the first fixture that fails to read, parse, or write
    #[serde(default)]
    pub fail_fast: bool,
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            fail_fast: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Where to write the JSON batch report (optional)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Convert to BatchConfig
    pub fn to_batch_config(&self) -> BatchConfig {
        BatchConfig {
            jobs: self.batch.jobs.max(1),
            fail_fast: self.batch.fail_fast,
            convert: self.convert,
        }
    }
}

/// Load configuration from file, or defaults when no file was given
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = toml::from_str(&content).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}
