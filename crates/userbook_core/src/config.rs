//! Core configuration: TOML file plus environment overrides.
//!
//! # Invariants
//! - Precedence is defaults < file < environment.
//! - A loaded config has a non-empty `db_path` and a positive banner delay.

use crate::controller::registration::DEFAULT_SUCCESS_BANNER_MS;
use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "USERBOOK_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "USERBOOK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "USERBOOK_LOG_DIR";
pub const ENV_SUCCESS_BANNER_MS: &str = "USERBOOK_SUCCESS_BANNER_MS";

const DEFAULT_DB_FILE_NAME: &str = "userbook.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Runtime settings for the core and its CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub success_banner_ms: i64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            success_banner_ms: DEFAULT_SUCCESS_BANNER_MS,
        }
    }
}

impl CoreConfig {
    /// Parses a TOML document on top of defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Applies overrides from `lookup` (normally `std::env::var`).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(ENV_DB_PATH) {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value)).filter(|dir| !dir.as_os_str().is_empty());
        }
        if let Some(value) = lookup(ENV_SUCCESS_BANNER_MS) {
            self.success_banner_ms = value.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "{ENV_SUCCESS_BANNER_MS} must be an integer, got `{value}`"
                ))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
        }
        if self.success_banner_ms <= 0 {
            return Err(ConfigError::Invalid(format!(
                "success_banner_ms must be positive, got {}",
                self.success_banner_ms
            )));
        }
        Ok(())
    }
}

/// Loads config from an optional TOML file and the process environment.
///
/// A missing `path` means defaults plus environment only; a given path
/// that cannot be read is an error.
pub fn load_config(path: Option<&Path>) -> Result<CoreConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            CoreConfig::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        }
        None => CoreConfig::default(),
    };
    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}
