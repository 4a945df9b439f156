//! Process-level settings read from the environment.

use super::constants::{CONFIG_DIR, CONFIG_FILE_NAME};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable naming the project root.
pub const ROOT_DIR_ENV: &str = "HOUSING_ROOT_DIR";
/// Environment variable overriding the pipeline document path.
pub const CONFIG_PATH_ENV: &str = "HOUSING_CONFIG_PATH";
/// Environment variable for the bind host.
pub const HOST_ENV: &str = "HOUSING_HOST";
/// Environment variable for the bind port.
pub const PORT_ENV: &str = "HOUSING_PORT";
/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "HOUSING_LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidEnv {
                name: LOG_FORMAT_ENV.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Settings for the serving process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Project root; artifact trees and config paths are resolved against it.
    pub root_dir: PathBuf,
    /// Path of the pipeline document.
    pub config_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl AppSettings {
    /// Builds settings rooted at `root_dir` with every other value defaulted.
    #[must_use]
    pub fn with_root(root_dir: impl Into<PathBuf>) -> Self {
        let root_dir = root_dir.into();
        Self {
            config_path: root_dir.join(CONFIG_DIR).join(CONFIG_FILE_NAME),
            root_dir,
            host: "0.0.0.0".to_string(),
            port: 5000,
            log_format: LogFormat::default(),
        }
    }

    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root_dir = match lookup(ROOT_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir().map_err(|source| ConfigError::Read {
                path: PathBuf::from("."),
                source,
            })?,
        };
        let mut settings = Self::with_root(root_dir);

        if let Some(path) = lookup(CONFIG_PATH_ENV) {
            settings.config_path = PathBuf::from(path);
        }
        if let Some(host) = lookup(HOST_ENV) {
            settings.host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            settings.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: PORT_ENV.to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            settings.log_format = format.parse()?;
        }

        Ok(settings)
    }

    /// Socket address string for the HTTP listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
