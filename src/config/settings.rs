//! TOML-based configuration for MOSDEX.
//!
//! Example configuration (`mosdex.toml`):
//! ```toml
//! [resolver]
//! max_depth = 7
//!
//! [logging]
//! filter = "mosdex=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Limits;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Dependency resolution and translation settings.
    pub resolver: ResolverSettings,

    /// Log output settings.
    pub logging: LoggingSettings,
}

/// Resolver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Maximum subquery / dependency-chain nesting, shared by the SQL
    /// translator, the dependency scanner and the resolver.
    pub max_depth: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_depth: Limits::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `MOSDEX_CONFIG`
    /// 2. `./mosdex.toml`
    /// 3. `~/.config/mosdex/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("MOSDEX_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("mosdex.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("mosdex").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Check values that parse but make no sense.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.resolver.max_depth == 0 {
            return Err(SettingsError::InvalidConfig(
                "resolver.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Recursion limits for the translator, scanner and resolver.
    pub fn limits(&self) -> Limits {
        Limits::new(self.resolver.max_depth)
    }
}
