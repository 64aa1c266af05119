use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GateError, Result};

/// Default location of the CRI socket.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/podgate/podgate.sock";

/// Podgate configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Unix socket the CRI services are served on
    pub socket_path: PathBuf,

    /// Default log filter, used when `RUST_LOG` is unset
    pub log_level: String,

    /// Log output format
    pub log_format: LogFormat,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl GateConfig {
    /// Load configuration from a YAML file. Missing keys take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GateError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: GateConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.socket_path.as_os_str().is_empty() {
            return Err(GateError::ConfigError("socket path is empty".to_string()));
        }
        if self.socket_path.is_dir() {
            return Err(GateError::ConfigError(format!(
                "socket path {} is a directory",
                self.socket_path.display()
            )));
        }
        if self.log_level.trim().is_empty() {
            return Err(GateError::ConfigError("log level is empty".to_string()));
        }
        Ok(())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(GateError::ConfigError(format!(
                "unknown log format: {other}"
            ))),
        }
    }
}
