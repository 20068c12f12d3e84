//! The management cluster's map of data clusters.
//!
//! Each data cluster occupies two keys: its encoded [`DataClusterEntry`]
//! under [`DATA_CLUSTER_METADATA_PREFIX`] and its connection string under
//! [`DATA_CLUSTER_CONNECTION_PREFIX`], both suffixed with the cluster name.

use std::collections::BTreeMap;

use bytes::Bytes;
use metacluster_types::{ClusterName, ClusterUsage};

use crate::{DataClusterEntry, DataClusterState, MetadataError, MetadataStore};

pub const DATA_CLUSTER_METADATA_PREFIX: &str = "metacluster/dataCluster/metadata/";
pub const DATA_CLUSTER_CONNECTION_PREFIX: &str = "metacluster/dataCluster/connectionString/";

fn metadata_key(name: &ClusterName) -> Vec<u8> {
    [DATA_CLUSTER_METADATA_PREFIX.as_bytes(), name.as_bytes()].concat()
}

fn connection_key(name: &ClusterName) -> Vec<u8> {
    [DATA_CLUSTER_CONNECTION_PREFIX.as_bytes(), name.as_bytes()].concat()
}

// ============================================================================
// Records
// ============================================================================

/// A data cluster entry together with how to reach the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataClusterMetadata {
    pub entry: DataClusterEntry,
    pub connection_string: String,
}

impl DataClusterMetadata {
    pub fn new(entry: DataClusterEntry, connection_string: impl Into<String>) -> Self {
        Self {
            entry,
            connection_string: connection_string.into(),
        }
    }

    /// Compares operator-configured fields, including the connection string.
    pub fn matches_configuration(&self, other: &DataClusterMetadata) -> bool {
        self.entry.matches_configuration(&other.entry)
            && self.connection_string == other.connection_string
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "entry": self.entry.to_json(),
            "connection_string": self.connection_string,
        })
    }
}

/// Summary of the whole metacluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetaclusterMetrics {
    pub num_data_clusters: usize,
    pub tenant_group_capacity: ClusterUsage,
    pub tenant_groups_allocated: ClusterUsage,
}

impl MetaclusterMetrics {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "num_data_clusters": self.num_data_clusters,
            "tenant_group_capacity": self.tenant_group_capacity.num_tenant_groups,
            "tenant_groups_allocated": self.tenant_groups_allocated.num_tenant_groups,
        })
    }
}

/// Sums capacity and allocation over a set of clusters.
///
/// Returns `(capacity, allocated)`. Each cluster contributes
/// `max(capacity, allocated)` to the capacity so an over-allocated cluster
/// never makes the total headroom negative.
pub fn metacluster_capacity<'a>(
    clusters: impl IntoIterator<Item = &'a DataClusterMetadata>,
) -> (ClusterUsage, ClusterUsage) {
    clusters.into_iter().fold(
        (ClusterUsage::ZERO, ClusterUsage::ZERO),
        |(capacity, allocated), cluster| {
            let entry = &cluster.entry;
            (
                capacity.saturating_add(entry.capacity.max(entry.allocated)),
                allocated.saturating_add(entry.allocated),
            )
        },
    )
}

// ============================================================================
// Management Cluster Metadata
// ============================================================================

/// Typed access to the data cluster map stored on the management cluster.
#[derive(Debug, Clone)]
pub struct ManagementClusterMetadata<S> {
    store: S,
}

impl<S: MetadataStore> ManagementClusterMetadata<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn get_cluster(
        &self,
        name: &ClusterName,
    ) -> Result<Option<DataClusterMetadata>, MetadataError> {
        let Some(entry_bytes) = self.store.get(&metadata_key(name))? else {
            return Ok(None);
        };
        let entry = DataClusterEntry::decode(&entry_bytes)?;
        let connection_string = self.load_connection_string(name)?;
        Ok(Some(DataClusterMetadata::new(entry, connection_string)))
    }

    /// Writes both keys of a cluster, replacing any previous values.
    pub fn set_cluster(
        &self,
        name: &ClusterName,
        metadata: &DataClusterMetadata,
    ) -> Result<(), MetadataError> {
        self.store.set(&metadata_key(name), metadata.entry.encode())?;
        self.store.set(
            &connection_key(name),
            Bytes::from(metadata.connection_string.clone().into_bytes()),
        )?;
        tracing::info!(
            cluster = %name,
            id = %metadata.entry.id.short_string(),
            capacity = metadata.entry.capacity.num_tenant_groups,
            allocated = metadata.entry.allocated.num_tenant_groups,
            state = %metadata.entry.state,
            "stored data cluster"
        );
        Ok(())
    }

    pub fn remove_cluster(&self, name: &ClusterName) -> Result<(), MetadataError> {
        self.store.clear(&metadata_key(name))?;
        self.store.clear(&connection_key(name))?;
        tracing::info!(cluster = %name, "removed data cluster");
        Ok(())
    }

    /// Loads every registered data cluster, keyed by name.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Corrupt`] if a key suffix is not a valid
    /// cluster name or an entry has no connection string.
    pub fn list_clusters(&self) -> Result<BTreeMap<ClusterName, DataClusterMetadata>, MetadataError> {
        let prefix = DATA_CLUSTER_METADATA_PREFIX.as_bytes();
        let mut clusters = BTreeMap::new();
        for (key, value) in self.store.scan_prefix(prefix)? {
            let suffix = &key[prefix.len()..];
            let name = std::str::from_utf8(suffix)
                .ok()
                .and_then(|s| ClusterName::new(s).ok())
                .ok_or_else(|| {
                    MetadataError::Corrupt(format!(
                        "invalid data cluster name in key {}",
                        String::from_utf8_lossy(&key)
                    ))
                })?;
            let entry = DataClusterEntry::decode(&value)?;
            let connection_string = self.load_connection_string(&name)?;
            clusters.insert(name, DataClusterMetadata::new(entry, connection_string));
        }
        Ok(clusters)
    }

    pub fn capacity(&self) -> Result<(ClusterUsage, ClusterUsage), MetadataError> {
        let clusters = self.list_clusters()?;
        Ok(metacluster_capacity(clusters.values()))
    }

    pub fn metrics(&self) -> Result<MetaclusterMetrics, MetadataError> {
        let clusters = self.list_clusters()?;
        let (tenant_group_capacity, tenant_groups_allocated) =
            metacluster_capacity(clusters.values());
        Ok(MetaclusterMetrics {
            num_data_clusters: clusters.len(),
            tenant_group_capacity,
            tenant_groups_allocated,
        })
    }

    /// Lists clusters that can accept new tenant groups, least allocated
    /// first. Ties are broken by name.
    pub fn clusters_with_capacity(&self) -> Result<Vec<(ClusterUsage, ClusterName)>, MetadataError> {
        let mut available: Vec<_> = self
            .list_clusters()?
            .into_iter()
            .filter(|(_, m)| m.entry.state == DataClusterState::Ready && m.entry.has_capacity())
            .map(|(name, m)| (m.entry.allocated, name))
            .collect();
        available.sort();
        Ok(available)
    }

    fn load_connection_string(&self, name: &ClusterName) -> Result<String, MetadataError> {
        let bytes = self.store.get(&connection_key(name))?.ok_or_else(|| {
            MetadataError::Corrupt(format!("data cluster {name} has no connection string"))
        })?;
        String::from_utf8(bytes.to_vec()).map_err(|_| {
            MetadataError::Corrupt(format!("data cluster {name} connection string is not UTF-8"))
        })
    }
}
