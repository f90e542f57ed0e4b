use crate::{InsightError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = ".code-insight.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplayConfig {
    /// Number of reconstructed stacks the timeline keeps around
    #[serde(default = "default_stack_cache_size")]
    pub stack_cache_size: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            stack_cache_size: default_stack_cache_size(),
        }
    }
}

fn default_stack_cache_size() -> usize {
    64
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    /// Default output format ("text" or "json")
    #[serde(default)]
    pub format: Option<String>,
}

impl Config {
    /// Load configuration from a file in the working directory
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| {
            InsightError::FileError(format!(
                "Failed to read config file {:?}: {}",
                config_path, e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            InsightError::FileError(format!(
                "Failed to parse TOML config from {:?}: {}",
                config_path, e
            ))
        })
    }

    /// Load default config if file is missing, otherwise warn on parse failure
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config: {}. Using defaults.", e);
                Config::default()
            }
        }
    }

    /// Whether output should be JSON unless the command line says otherwise.
    pub fn prefers_json(&self) -> bool {
        self.output.format.as_deref() == Some("json")
    }
}
