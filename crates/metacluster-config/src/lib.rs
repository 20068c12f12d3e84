//! Configuration management for metacluster tooling
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence, applied by the caller)
//! 2. Environment variables (MC_* prefix)
//! 3. metacluster.local.toml (gitignored, local overrides)
//! 4. metacluster.toml (git-tracked, project config)
//! 5. ~/.config/metacluster/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main metacluster configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaclusterConfig {
    pub store: StoreConfig,
    pub management: ManagementConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding this cluster's metadata store.
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".metacluster/data"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagementConfig {
    /// Upper bound on registered data clusters.
    pub max_data_clusters: usize,
    /// Tenant group capacity given to clusters added without one.
    pub default_capacity: u64,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            max_data_clusters: 100_000,
            default_capacity: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.level)
            .map_err(|_| ConfigError::ValidationError(format!("unknown log level {:?}", self.level)))
    }
}

impl MetaclusterConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.management.max_data_clusters == 0 {
            return Err(ConfigError::ValidationError(
                "management.max_data_clusters must be at least 1".to_string(),
            ));
        }
        self.logging.level_filter()?;
        Ok(())
    }

    /// Resolve relative paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        let base = base_dir.as_ref();

        if self.store.data_dir.is_relative() {
            self.store.data_dir = base.join(&self.store.data_dir);
        }
    }
}
