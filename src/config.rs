//! Configuration file handling for capture-offsets.
//!
//! Loads defaults from `~/.config/capture-offsets/config.toml` or a custom
//! path. Command-line flags always win over file values.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::camera::CameraSettings;
use crate::session::CapturePlan;

/// Configuration file structure for capture-offsets.
///
/// ```toml
/// [printer]
/// host = "duet3.local"
/// poll_interval_ms = 500
/// idle_timeout_secs = 120
///
/// [camera]
/// device = 0
/// discard_frames = 4
///
/// [capture]
/// repeat = 10
/// output = "capture_offsets.tar.gz"
/// scratch_dir = "/var/tmp"
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub printer: PrinterConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct PrinterConfig {
    pub host: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CameraConfig {
    pub device: Option<u32>,
    pub discard_frames: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CaptureConfig {
    pub repeat: Option<u32>,
    pub output: Option<PathBuf>,
    /// Where the temporary capture directory is created
    pub scratch_dir: Option<PathBuf>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Printer hostname, IP or URL
    pub duet: String,
    pub camera: CameraSettings,
    pub plan: CapturePlan,
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// With no explicit path the default location is tried and a missing
    /// file yields the default config. An explicit path must exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_path(), false),
        };

        if !explicit && !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Errors that can occur when loading or resolving configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("capture-offsets").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/capture-offsets/config.toml")
        })
}
