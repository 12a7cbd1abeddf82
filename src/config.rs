use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScribbleError};

/// Config file picked up from the working directory when no `--config` is given.
pub const CONFIG_FILE: &str = "scribble.yaml";

/// Runtime configuration.
///
/// Resolved in layers: built-in defaults, then the YAML config file, then
/// command line flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON data file holding every note
    pub data_file: PathBuf,
    /// Address the HTTP server listens on
    pub bind: String,
    /// Default log level when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("db.json"),
            bind: "127.0.0.1:3000".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Parse a YAML document. An empty document yields the defaults.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise `scribble.yaml` in `dir` is used
    /// when present, and the defaults when not.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = dir.join(CONFIG_FILE);
                if !candidate.exists() {
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let raw = fs::read_to_string(&path).map_err(|e| {
            ScribbleError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&raw)
    }

    /// Apply command line overrides on top of the loaded values.
    pub fn with_overrides(mut self, data_file: Option<PathBuf>, bind: Option<String>) -> Self {
        if let Some(data_file) = data_file {
            self.data_file = data_file;
        }
        if let Some(bind) = bind {
            self.bind = bind;
        }
        self
    }
}
