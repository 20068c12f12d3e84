//! CLI command implementations.

pub mod capacity;
pub mod check;
pub mod cluster;
pub mod registration;

use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use metacluster_config::MetaclusterConfig;
use metacluster_metadata::{
    FileStore, ManagementClusterMetadata, ManagementRegistration, MetaclusterDirectory,
    MetaclusterRegistration,
};

/// Loaded configuration shared by every command.
pub struct CliContext {
    pub config: MetaclusterConfig,
}

impl CliContext {
    pub fn new(config: MetaclusterConfig) -> Self {
        Self { config }
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.store.data_dir
    }

    pub fn open_store(&self) -> Result<FileStore> {
        FileStore::open(self.data_dir())
            .with_context(|| format!("Failed to open store at {}", self.data_dir().display()))
    }

    pub fn directory(&self) -> Result<MetaclusterDirectory<FileStore>> {
        Ok(MetaclusterDirectory::new(self.open_store()?))
    }

    /// Opens the data cluster map, failing unless this is a management
    /// cluster.
    pub fn management(
        &self,
    ) -> Result<(ManagementRegistration, ManagementClusterMetadata<FileStore>)> {
        let store = self.open_store()?;
        let registration = MetaclusterDirectory::new(store.clone())
            .get()
            .context("Failed to read local registration")?;
        match registration {
            Some(MetaclusterRegistration::Management(m)) => {
                Ok((m, ManagementClusterMetadata::new(store)))
            }
            Some(other) => anyhow::bail!(
                "This is a {} cluster; the command needs the management cluster",
                other.cluster_type()
            ),
            None => anyhow::bail!(
                "This cluster is standalone. Run 'mcctl registration init-management' first."
            ),
        }
    }
}

pub fn encode_registration(registration: &MetaclusterRegistration) -> String {
    STANDARD.encode(registration.encode())
}

pub fn decode_registration(text: &str) -> Result<MetaclusterRegistration> {
    let bytes = STANDARD
        .decode(text.trim())
        .context("Registration is not valid base64")?;
    MetaclusterRegistration::decode(&bytes).context("Registration bytes are invalid")
}
