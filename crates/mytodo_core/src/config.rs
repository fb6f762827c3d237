//! Runtime configuration resolved from the process environment.
//!
//! # Responsibility
//! - Pick the storage mode, document database path and log level.
//!
//! # Invariants
//! - Blank values fall back to defaults; unknown values are rejected.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "MYTODO_DB_PATH";
pub const ENV_STORAGE: &str = "MYTODO_STORAGE";
pub const ENV_LOG_LEVEL: &str = "MYTODO_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "mytodo_documents.sqlite3";

/// Where list items live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Process-local list, lost on exit.
    Memory,
    /// Per-user document collection with live snapshots.
    Synced,
}

impl StorageMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Synced => "synced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedStorageMode(String),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedStorageMode(value) => write!(
                f,
                "unsupported {ENV_STORAGE} `{value}`; expected memory|synced"
            ),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub storage: StorageMode,
    pub db_path: PathBuf,
    pub log_level: &'static str,
}

impl CoreConfig {
    /// Reads `MYTODO_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let storage = match non_blank(ENV_STORAGE) {
            None => StorageMode::Synced,
            Some(value) => parse_storage_mode(&value)?,
        };

        let db_path = non_blank(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let log_level = match non_blank(ENV_LOG_LEVEL) {
            None => default_log_level(),
            Some(value) => normalize_level(&value).map_err(ConfigError::InvalidLogLevel)?,
        };

        Ok(Self {
            storage,
            db_path,
            log_level,
        })
    }
}

fn parse_storage_mode(value: &str) -> Result<StorageMode, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "memory" => Ok(StorageMode::Memory),
        "synced" => Ok(StorageMode::Synced),
        _ => Err(ConfigError::UnsupportedStorageMode(value.to_string())),
    }
}
