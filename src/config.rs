//! Configuration
//!
//! Settings come from a TOML file. Every field has a default, so an empty
//! file (or no file at all) is a valid configuration.

use crate::error::{MeasureError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "AR_MEASURE_CONFIG";
/// File name looked up in the platform config directory
pub const CONFIG_FILE_NAME: &str = "ar-measure.config.toml";

pub const DEFAULT_BASE_URL: &str = "http://192.168.11.13:5000";
pub const DEFAULT_UPLOAD_PATH: &str = "/upload";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    pub upload: UploadConfig,
    pub capture: CaptureConfig,
    pub logging: LoggingConfig,
}

/// Where measurements are sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub base_url: String,
    pub path: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            path: DEFAULT_UPLOAD_PATH.to_string(),
        }
    }
}

/// Size of the view captured after a measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl MeasureConfig {
    /// Parse a config from TOML text; `origin` only labels errors
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| MeasureError::Config {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| MeasureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load from the first source that exists.
    ///
    /// Order: `explicit`, then `AR_MEASURE_CONFIG`, then the platform config
    /// directory. Explicit and env paths must exist; the platform file is
    /// optional and defaults apply without it.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "Loading config from explicit path");
            return Self::from_file(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from) {
            debug!(path = %path.display(), "Loading config from {}", CONFIG_ENV_VAR);
            return Self::from_file(&path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => {
                debug!(path = %path.display(), "Loading config from platform directory");
                Self::from_file(&path)
            }
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// `ar-measure.config.toml` inside the platform config directory
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ar-measure").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
