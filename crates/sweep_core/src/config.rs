//! Sweep configuration and the per-job config loading seam.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SweepError;

pub const DEFAULT_SWEEP_DIR: &str = "multirun";
pub const DEFAULT_SWEEPER: &str = "basic";
pub const DEFAULT_LAUNCHER: &str = "basic";

/// Names a registered plugin and carries its `params` object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PluginSelection {
    pub name: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl PluginSelection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Deserializes `params` into a plugin's typed parameter struct.
    pub fn parse_params<T: DeserializeOwned>(&self, kind: &'static str) -> Result<T, SweepError> {
        serde_json::from_value(Value::Object(self.params.clone())).map_err(|error| {
            SweepError::InvalidPluginParams {
                kind,
                name: self.name.clone(),
                message: error.to_string(),
            }
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepConfig {
    #[serde(default = "default_sweep_dir")]
    pub sweep_dir: PathBuf,
    #[serde(default = "default_sweeper")]
    pub sweeper: PluginSelection,
    #[serde(default = "default_launcher")]
    pub launcher: PluginSelection,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sweep_dir: default_sweep_dir(),
            sweeper: default_sweeper(),
            launcher: default_launcher(),
        }
    }
}

impl SweepConfig {
    pub fn from_json_str(text: &str) -> Result<Self, SweepError> {
        serde_json::from_str(text)
            .map_err(|error| SweepError::InvalidConfig(format!("malformed sweep config: {error}")))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, SweepError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

fn default_sweep_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SWEEP_DIR)
}

fn default_sweeper() -> PluginSelection {
    PluginSelection::new(DEFAULT_SWEEPER).with_param("max_batch_size", Value::Null)
}

fn default_launcher() -> PluginSelection {
    PluginSelection::new(DEFAULT_LAUNCHER)
}

/// Produces the configuration a single job runs with.
///
/// Launchers call this once per job with that job's overrides.
pub trait ConfigLoader: Send + Sync {
    fn load_job_config(&self, overrides: &[String]) -> Result<Value, SweepError>;
}

/// Hands every job the same base configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigLoader {
    base: Value,
}

impl StaticConfigLoader {
    pub fn new(base: Value) -> Self {
        Self { base }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load_job_config(&self, _overrides: &[String]) -> Result<Value, SweepError> {
        Ok(self.base.clone())
    }
}
