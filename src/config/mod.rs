//! Configuration loading and management
//!
//! Settings live in `~/.studyhub/config.toml`. Every key is optional; a
//! missing file behaves exactly like an empty one.

mod io;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Log filter used when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Where progression data is kept
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file (default: ~/.studyhub/progress.db)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Directory for the local fallback cache (default: ~/.studyhub/cache)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"studyhub=debug"`
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Resolved database location
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("progress.db"))
    }

    /// Resolved cache directory
    pub fn cache_dir(&self) -> PathBuf {
        self.storage
            .cache_dir
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("cache"))
    }
}
