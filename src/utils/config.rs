//! Configuration file handling
//!
//! Session configuration lives in a JSON file so operators can tune
//! thresholds per deployment without rebuilding. Absent fields fall back
//! to the built-in defaults, and every loaded configuration is validated
//! before it is handed out.

use crate::api::types::{TrackError, TrackerConfig};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised while loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// File could not be read or written
    Io { details: String },
    /// File content is not valid configuration JSON
    Parse { details: String },
    /// A value is outside its legal range
    Invalid { parameter: String, value: String },
    /// Save was requested but no file path is associated
    NoPath,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { details } => write!(f, "Configuration file error: {}", details),
            ConfigError::Parse { details } => {
                write!(f, "Configuration parse error: {}", details)
            }
            ConfigError::Invalid { parameter, value } => {
                write!(f, "Invalid configuration: {} = {}", parameter, value)
            }
            ConfigError::NoPath => write!(f, "No configuration file path set"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<TrackError> for ConfigError {
    fn from(error: TrackError) -> Self {
        match error {
            TrackError::ConfigurationError { parameter, value } => {
                ConfigError::Invalid { parameter, value }
            }
            other => ConfigError::Parse {
                details: other.to_string(),
            },
        }
    }
}

/// Loads, validates, and persists session configuration
#[derive(Debug, Clone)]
pub struct ConfigurationManager {
    config: TrackerConfig,
    path: Option<PathBuf>,
}

impl ConfigurationManager {
    /// Manager holding the built-in defaults, not bound to a file
    pub fn new() -> Self {
        Self {
            config: TrackerConfig::default(),
            path: None,
        }
    }

    /// Load configuration from a JSON file and remember the path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    /// Replace the current configuration with the file's content.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            details: e.to_string(),
        })?;
        let config: TrackerConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                details: e.to_string(),
            })?;
        config.validate()?;

        self.config = config;
        self.path = Some(path.as_ref().to_path_buf());
        Ok(())
    }

    /// Write the current configuration to a specific file.
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(&self.config).map_err(|e| ConfigError::Parse {
                details: e.to_string(),
            })?;
        fs::write(&path, content).map_err(|e| ConfigError::Io {
            details: e.to_string(),
        })?;
        self.path = Some(path.as_ref().to_path_buf());
        Ok(())
    }

    /// Write the current configuration back to the file it came from.
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::NoPath),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Replace the configuration after validating it.
    pub fn set_config(&mut self, config: TrackerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Default for ConfigurationManager {
    fn default() -> Self {
        Self::new()
    }
}
