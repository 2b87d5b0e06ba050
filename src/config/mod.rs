//! Library configuration, loaded from JSON.
//!
//! Every field has a default, so `{}` is a complete configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::tasks::{QueuerOptions, TaskFailurePolicy};

/// Default name of the per-directory code mapping file.
pub const DEFAULT_MAPPINGS_FILE: &str = ".ilatex-mappings";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub visualisations: VisualisationConfig,
    pub tasks: TaskConfig,
    pub mappings: MappingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisualisationConfig {
    /// Provider kinds to register. `None` registers every built-in provider.
    pub enabled: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskConfig {
    pub failure_policy: TaskFailurePolicy,
    /// Per-task deadline in milliseconds
    pub timeout_ms: Option<u64>,
}

impl TaskConfig {
    pub fn queuer_options(&self) -> QueuerOptions {
        QueuerOptions {
            failure_policy: self.failure_policy,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingConfig {
    /// File name looked up next to source files by `load_code_mappings_in`.
    pub file_name: String,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_MAPPINGS_FILE.to_string(),
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// The provider allow-list, if one is configured.
    pub fn enabled_providers(&self) -> Option<&[String]> {
        self.visualisations.enabled.as_deref()
    }
}
