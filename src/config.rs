//! Configuration management for textenrich using the prefer crate.
//!
//! A config file holds the API settings, the ordered stage list and the
//! batch worker count:
//!
//! ```toml
//! workers = 8
//!
//! [api]
//! url = "http://localhost:8181/rest/v1"
//!
//! [[stages]]
//! type = "language"
//! target_field = "language"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ApiConfig;
use crate::enrich::StageConfig;

/// Name used for config file discovery (`textenrich.toml`, `.yaml`, `.json`).
pub const CONFIG_NAME: &str = "textenrich";

/// Errors from reading a config file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {format} config {}: {message}", path.display())]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Text analytics service settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Stages, run in the order listed
    #[serde(default)]
    pub stages: Vec<StageConfig>,

    /// Documents processed concurrently by `run`
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Path the config was loaded from
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

fn default_workers() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            stages: Vec::new(),
            workers: default_workers(),
            source_path: None,
        }
    }
}

impl Config {
    /// Load configuration using prefer for discovery.
    ///
    /// Falls back to defaults (plus env vars) when no config file exists.
    /// A config file that exists but cannot be parsed is an error.
    pub async fn load() -> Result<Self, ConfigLoadError> {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await,
                None => Ok(Self::default_with_env()),
            },
            Err(e) => {
                tracing::debug!("no config file discovered: {}", e);
                Ok(Self::default_with_env())
            }
        }
    }

    /// Default config with API settings taken from the environment.
    pub fn default_with_env() -> Self {
        let mut config = Self::default();
        config.api = config.api.with_env_fallbacks();
        config
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigLoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(path, &contents)?;
        config.source_path = Some(path.to_path_buf());
        config.api = config.api.with_env_fallbacks();
        Ok(config)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigLoadError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_err = |format: &'static str, message: String| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_err("TOML", e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_err("YAML", e.to_string()))
            }
            _ => serde_json::from_str(contents).map_err(|e| parse_err("JSON", e.to_string())),
        }
    }
}
