//! Configuration loader with multi-source merging

use crate::{MetaclusterConfig, Paths};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
    env_vars: Option<config::Map<String, String>>,
    user_config: bool,
}

impl ConfigLoader {
    /// Create a new config loader with default project directory (current dir)
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "MC".to_string(),
            env_vars: None,
            user_config: true,
        }
    }

    /// Set the project directory
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the environment variable prefix (default: "MC")
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Read variables from `vars` instead of the process environment
    pub fn with_env_vars(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env_vars = Some(vars.into_iter().collect());
        self
    }

    /// Skip ~/.config/metacluster/config.toml
    pub fn without_user_config(mut self) -> Self {
        self.user_config = false;
        self
    }

    /// Load configuration from all sources with proper precedence
    ///
    /// Environment keys use `__` between section and field, e.g.
    /// `MC_MANAGEMENT__MAX_DATA_CLUSTERS=10`.
    pub fn load(self) -> Result<MetaclusterConfig> {
        let mut builder = config::Config::builder();

        // 1. Start with built-in defaults
        let defaults = MetaclusterConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. User config (~/.config/metacluster/config.toml)
        if self.user_config
            && let Ok(user_config_file) = Paths::new().user_config_file()
            && user_config_file.exists()
        {
            builder = builder.add_source(
                config::File::from(user_config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 3. Project config (metacluster.toml)
        let project_config_file = Paths::project_config_file(&self.project_dir);
        if project_config_file.exists() {
            builder = builder.add_source(
                config::File::from(project_config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 4. Local config (metacluster.local.toml, gitignored)
        let local_config_file = Paths::local_config_file(&self.project_dir);
        if local_config_file.exists() {
            builder = builder.add_source(
                config::File::from(local_config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 5. Environment variables (MC_*)
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(self.env_vars.clone()),
        );

        // Build and deserialize
        let config = builder.build().context("Failed to build configuration")?;

        let mut metacluster_config: MetaclusterConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        metacluster_config
            .validate()
            .context("Configuration failed validation")?;

        // Resolve relative paths
        metacluster_config.resolve_paths(&self.project_dir);

        tracing::debug!(
            project_dir = %self.project_dir.display(),
            data_dir = %metacluster_config.store.data_dir.display(),
            "loaded configuration"
        );

        Ok(metacluster_config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default(self) -> MetaclusterConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn loader(project_dir: &Path) -> ConfigLoader {
        ConfigLoader::new()
            .with_project_dir(project_dir)
            .without_user_config()
            .with_env_vars(Vec::new())
    }

    #[test]
    fn test_load_defaults() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = loader(temp_dir.path())
            .load()
            .expect("Failed to load config");

        assert_eq!(config.management.max_data_clusters, 100_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_project_config() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        let config_content = r#"
[store]
data_dir = "state"

[management]
max_data_clusters = 8
default_capacity = 4

[logging]
level = "debug"
"#;
        fs::write(project_dir.join("metacluster.toml"), config_content)
            .expect("Failed to write config");

        let config = loader(project_dir).load().expect("Failed to load config");

        assert_eq!(config.store.data_dir, project_dir.join("state"));
        assert_eq!(config.management.max_data_clusters, 8);
        assert_eq!(config.management.default_capacity, 4);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_local_overrides() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(
            project_dir.join("metacluster.toml"),
            r#"
[management]
max_data_clusters = 8
default_capacity = 4
"#,
        )
        .expect("Failed to write project config");

        fs::write(
            project_dir.join("metacluster.local.toml"),
            r#"
[management]
max_data_clusters = 2
"#,
        )
        .expect("Failed to write local config");

        let config = loader(project_dir).load().expect("Failed to load config");

        // Local config should override project config
        assert_eq!(config.management.max_data_clusters, 2);
        assert_eq!(config.management.default_capacity, 4);
    }

    #[test]
    fn test_env_overrides_files() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(
            project_dir.join("metacluster.toml"),
            "[management]\nmax_data_clusters = 8\n",
        )
        .expect("Failed to write project config");

        let config = loader(project_dir)
            .with_env_vars([
                (
                    "MC_MANAGEMENT__MAX_DATA_CLUSTERS".to_string(),
                    "3".to_string(),
                ),
                ("MC_LOGGING__LEVEL".to_string(), "warn".to_string()),
            ])
            .load()
            .expect("Failed to load config");

        assert_eq!(config.management.max_data_clusters, 3);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(
            project_dir.join("metacluster.toml"),
            "[management]\nmax_data_clusters = 0\n",
        )
        .expect("Failed to write project config");

        assert!(loader(project_dir).load().is_err());
        assert_eq!(
            loader(project_dir)
                .load_or_default()
                .management
                .max_data_clusters,
            100_000
        );
    }

    #[test]
    fn test_path_resolution() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        let config = loader(project_dir).load().expect("Failed to load config");

        // Relative paths should be resolved to absolute
        assert!(config.store.data_dir.is_absolute());
        assert!(config.store.data_dir.starts_with(project_dir));
    }
}
