//! Data cluster records held by the management cluster.

use std::{fmt::Display, str::FromStr};

use bytes::Bytes;
use metacluster_types::{ClusterId, ClusterUsage};
use serde::{Deserialize, Serialize};

use crate::{
    DecodeError, ParseStateError,
    codec::{self, Versioned},
};

/// Schema id of the persisted [`DataClusterEntry`].
pub const DATA_CLUSTER_ENTRY_SCHEMA_ID: u32 = 929_511;

// ============================================================================
// Data Cluster State
// ============================================================================

/// Lifecycle state of a data cluster.
///
/// New clusters start `Ready`. A cluster moves to `Removing` when it is being
/// detached from the metacluster and to `Restoring` while its metadata is
/// rebuilt from a backup. Which transitions are legal is decided by a
/// [`TransitionPolicy`](crate::TransitionPolicy), not by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataClusterState {
    #[default]
    Ready,
    Removing,
    Restoring,
}

impl DataClusterState {
    pub const ALL: [DataClusterState; 3] = [
        DataClusterState::Ready,
        DataClusterState::Removing,
        DataClusterState::Restoring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataClusterState::Ready => "ready",
            DataClusterState::Removing => "removing",
            DataClusterState::Restoring => "restoring",
        }
    }

    /// Whether capacity or connection details may be changed.
    pub fn allows_configuration_change(&self) -> bool {
        matches!(self, DataClusterState::Ready)
    }

    /// Whether new tenants may be assigned to the cluster.
    pub fn allows_tenant_creation(&self) -> bool {
        matches!(self, DataClusterState::Ready)
    }

    /// Whether existing tenants may be updated or deleted.
    ///
    /// A removing cluster still lets tenants drain; a restoring cluster is
    /// frozen until the restore completes.
    pub fn allows_tenant_modification(&self) -> bool {
        matches!(self, DataClusterState::Ready | DataClusterState::Removing)
    }
}

impl Display for DataClusterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataClusterState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ready" => Ok(DataClusterState::Ready),
            "removing" => Ok(DataClusterState::Removing),
            "restoring" => Ok(DataClusterState::Restoring),
            _ => Err(ParseStateError(s.to_string())),
        }
    }
}

// ============================================================================
// Data Cluster Entry
// ============================================================================

/// The management cluster's record of one data cluster.
///
/// Field order is the persisted order and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataClusterEntry {
    pub id: ClusterId,
    pub capacity: ClusterUsage,
    pub allocated: ClusterUsage,
    pub state: DataClusterState,
}

impl DataClusterEntry {
    /// Creates an entry with the given capacity, a nil id and no allocation.
    pub fn new(capacity: ClusterUsage) -> Self {
        Self {
            id: ClusterId::NIL,
            capacity,
            allocated: ClusterUsage::ZERO,
            state: DataClusterState::Ready,
        }
    }

    pub fn with_usage(id: ClusterId, capacity: ClusterUsage, allocated: ClusterUsage) -> Self {
        Self {
            id,
            capacity,
            allocated,
            state: DataClusterState::Ready,
        }
    }

    /// Returns `true` if the cluster can take another tenant group.
    ///
    /// Allocation may exceed capacity after capacity is lowered; such a
    /// cluster simply has no room.
    pub fn has_capacity(&self) -> bool {
        self.allocated < self.capacity
    }

    /// Compares identity and capacity. Allocation and state are runtime
    /// fields and are ignored.
    pub fn matches_configuration(&self, other: &DataClusterEntry) -> bool {
        self.id == other.id && self.capacity == other.capacity
    }

    pub fn encode(&self) -> Bytes {
        codec::encode(self)
    }

    /// Decodes an entry written by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] for truncated, foreign or corrupt bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        codec::decode(bytes)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id.short_string(),
            "capacity": self.capacity.to_json(),
            "allocated": self.allocated.to_json(),
            "cluster_state": self.state.as_str(),
        })
    }
}

impl Display for DataClusterEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "id: {}, capacity: {}, allocated: {}, state: {}",
            self.id.short_string(),
            self.capacity.num_tenant_groups,
            self.allocated.num_tenant_groups,
            self.state
        )
    }
}

impl Versioned for DataClusterEntry {
    const SCHEMA_ID: u32 = DATA_CLUSTER_ENTRY_SCHEMA_ID;
    const RECORD: &'static str = "DataClusterEntry";
    type Wire = DataClusterEntry;

    fn to_wire(&self) -> DataClusterEntry {
        *self
    }

    fn from_wire(wire: DataClusterEntry) -> Result<Self, String> {
        Ok(wire)
    }
}
