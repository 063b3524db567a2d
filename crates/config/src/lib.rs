#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for lts
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/lts/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;
pub mod sections;

pub use sections::{BundleConfig, GeneralConfig, NetworkConfig, PathConfig, ProbeConfig, RuntimeConfig};

use lts_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub bundle: BundleConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub probe: ProbeConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("lts").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema.
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(path) = std::env::var("LTS_BUNDLE_PATH") {
            self.bundle.path = Some(path);
        }

        if let Ok(path) = std::env::var("LTS_RUNTIME_PATH") {
            self.runtime.path = Some(path);
        }

        if let Ok(path) = std::env::var("LTS_LIB_DIR") {
            self.paths.lib_dir = Some(path);
        }

        if let Ok(size) = std::env::var("LTS_INITIAL_HEAP_SIZE") {
            self.runtime.initial_heap_size = parse_heap_size("LTS_INITIAL_HEAP_SIZE", size)?;
        }

        if let Ok(size) = std::env::var("LTS_MAXIMUM_HEAP_SIZE") {
            self.runtime.maximum_heap_size = parse_heap_size("LTS_MAXIMUM_HEAP_SIZE", size)?;
        }

        if let Ok(force) = std::env::var("LTS_FORCE_SYSTEM_PROBE") {
            self.runtime.force_system_probe = match force.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "LTS_FORCE_SYSTEM_PROBE".to_string(),
                        value: force,
                    }
                    .into())
                }
            };
        }

        Ok(())
    }

    /// Explicit bundle directory, if configured
    #[must_use]
    pub fn bundle_path(&self) -> Option<PathBuf> {
        self.bundle.path.as_deref().and_then(normalize_path)
    }

    /// Explicit runtime home, if configured
    #[must_use]
    pub fn runtime_path(&self) -> Option<PathBuf> {
        self.runtime.path.as_deref().and_then(normalize_path)
    }

    /// Managed library directory (with default)
    ///
    /// # Errors
    ///
    /// Returns an error if no directory is configured and the platform has no
    /// data directory.
    pub fn lib_dir(&self) -> Result<PathBuf, Error> {
        if let Some(dir) = self.paths.lib_dir.as_deref().and_then(normalize_path) {
            return Ok(dir);
        }
        dirs::data_dir()
            .map(|dir| dir.join("lts").join("lib"))
            .ok_or_else(|| {
                ConfigError::MissingField {
                    field: "lib_dir".to_string(),
                }
                .into()
            })
    }
}

fn parse_heap_size(field: &str, value: String) -> Result<Option<u32>, Error> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    match value.trim().parse::<u32>() {
        Ok(0) => Ok(None),
        Ok(size) => Ok(Some(size)),
        Err(_) => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into()),
    }
}

/// Normalize a user-supplied path setting.
///
/// Empty or blank strings mean "unset". A leading `~` expands to the home
/// directory; if there is no home directory the path is kept as written.
#[must_use]
pub fn normalize_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed == "~" {
        return Some(dirs::home_dir().unwrap_or_else(|| PathBuf::from(trimmed)));
    }

    if let Some(rest) = trimmed
        .strip_prefix("~/")
        .or_else(|| trimmed.strip_prefix("~\\"))
    {
        if let Some(home) = dirs::home_dir() {
            return Some(home.join(rest));
        }
    }

    Some(PathBuf::from(trimmed))
}
