//! Metacluster membership records.
//!
//! Every cluster in a metacluster stores one [`MetaclusterRegistration`] in
//! its own directory slot. The management cluster holds the management
//! shape. Each data cluster holds the data shape, which additionally names
//! the data cluster itself.
//!
//! The data shape never reuses the metacluster's identity: a data cluster's
//! name and id both differ from the metacluster's. Constructors that take
//! identities from the caller's own state panic on a collision. Identities
//! that come from outside (decoded bytes, command-line input) go through
//! [`DataRegistration::try_new`] instead.

use std::fmt::Display;

use bytes::Bytes;
use metacluster_types::{ClusterId, ClusterName, ClusterType};
use serde::{Deserialize, Serialize};

use crate::{
    DecodeError, RegistrationError,
    codec::{self, Versioned},
};

/// Schema id of the persisted [`MetaclusterRegistration`].
pub const REGISTRATION_SCHEMA_ID: u32 = 13_448_589;

// ============================================================================
// Shapes
// ============================================================================

/// Registration held by the management cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManagementRegistration {
    metacluster_name: ClusterName,
    metacluster_id: ClusterId,
}

impl ManagementRegistration {
    pub fn new(metacluster_name: ClusterName, metacluster_id: ClusterId) -> Self {
        Self {
            metacluster_name,
            metacluster_id,
        }
    }

    pub fn metacluster_name(&self) -> &ClusterName {
        &self.metacluster_name
    }

    pub fn metacluster_id(&self) -> ClusterId {
        self.metacluster_id
    }

    /// Derives the registration a new data cluster should store.
    ///
    /// # Panics
    ///
    /// Panics if `name` or `id` equals the metacluster's.
    pub fn to_data_registration(&self, name: ClusterName, id: ClusterId) -> DataRegistration {
        DataRegistration::new(self.metacluster_name.clone(), name, self.metacluster_id, id)
    }

    /// Fallible form of [`to_data_registration`](Self::to_data_registration).
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] if `name` or `id` equals the
    /// metacluster's.
    pub fn try_to_data_registration(
        &self,
        name: ClusterName,
        id: ClusterId,
    ) -> Result<DataRegistration, RegistrationError> {
        DataRegistration::try_new(self.metacluster_name.clone(), name, self.metacluster_id, id)
    }
}

/// Registration held by a data cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataRegistration {
    metacluster_name: ClusterName,
    metacluster_id: ClusterId,
    name: ClusterName,
    id: ClusterId,
}

impl DataRegistration {
    /// # Panics
    ///
    /// Panics if `name` equals `metacluster_name` or `id` equals
    /// `metacluster_id`.
    pub fn new(
        metacluster_name: ClusterName,
        name: ClusterName,
        metacluster_id: ClusterId,
        id: ClusterId,
    ) -> Self {
        Self::try_new(metacluster_name, name, metacluster_id, id)
            .unwrap_or_else(|e| panic!("invalid data cluster registration: {e}"))
    }

    /// Creates a data registration from untrusted identities.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] if the data cluster's name or id equals
    /// the metacluster's.
    pub fn try_new(
        metacluster_name: ClusterName,
        name: ClusterName,
        metacluster_id: ClusterId,
        id: ClusterId,
    ) -> Result<Self, RegistrationError> {
        if name == metacluster_name {
            return Err(RegistrationError::NameCollision(name));
        }
        if id == metacluster_id {
            return Err(RegistrationError::IdCollision(id));
        }
        Ok(Self {
            metacluster_name,
            metacluster_id,
            name,
            id,
        })
    }

    pub fn metacluster_name(&self) -> &ClusterName {
        &self.metacluster_name
    }

    pub fn metacluster_id(&self) -> ClusterId {
        self.metacluster_id
    }

    pub fn name(&self) -> &ClusterName {
        &self.name
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    /// The registration the management cluster of this metacluster holds.
    pub fn to_management_registration(&self) -> ManagementRegistration {
        ManagementRegistration::new(self.metacluster_name.clone(), self.metacluster_id)
    }
}

// ============================================================================
// Registration
// ============================================================================

/// A cluster's membership in a metacluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetaclusterRegistration {
    Management(ManagementRegistration),
    Data(DataRegistration),
}

impl MetaclusterRegistration {
    pub fn management(metacluster_name: ClusterName, metacluster_id: ClusterId) -> Self {
        Self::Management(ManagementRegistration::new(metacluster_name, metacluster_id))
    }

    /// # Panics
    ///
    /// Panics if `name` equals `metacluster_name` or `id` equals
    /// `metacluster_id`.
    pub fn data(
        metacluster_name: ClusterName,
        name: ClusterName,
        metacluster_id: ClusterId,
        id: ClusterId,
    ) -> Self {
        Self::Data(DataRegistration::new(metacluster_name, name, metacluster_id, id))
    }

    pub fn cluster_type(&self) -> ClusterType {
        match self {
            Self::Management(_) => ClusterType::MetaclusterManagement,
            Self::Data(_) => ClusterType::MetaclusterData,
        }
    }

    pub fn metacluster_name(&self) -> &ClusterName {
        match self {
            Self::Management(m) => &m.metacluster_name,
            Self::Data(d) => &d.metacluster_name,
        }
    }

    pub fn metacluster_id(&self) -> ClusterId {
        match self {
            Self::Management(m) => m.metacluster_id,
            Self::Data(d) => d.metacluster_id,
        }
    }

    /// Name of the cluster holding this registration.
    ///
    /// For the management shape this is the metacluster name.
    pub fn name(&self) -> &ClusterName {
        match self {
            Self::Management(m) => &m.metacluster_name,
            Self::Data(d) => &d.name,
        }
    }

    /// Id of the cluster holding this registration.
    pub fn id(&self) -> ClusterId {
        match self {
            Self::Management(m) => m.metacluster_id,
            Self::Data(d) => d.id,
        }
    }

    /// Returns `true` if both registrations belong to the same metacluster
    /// and, when both are data-shaped, describe the same data cluster.
    ///
    /// A management registration matches any data registration of its
    /// metacluster, in either argument order.
    pub fn matches(&self, other: &MetaclusterRegistration) -> bool {
        if self.metacluster_name() != other.metacluster_name()
            || self.metacluster_id() != other.metacluster_id()
        {
            return false;
        }
        match (self, other) {
            (Self::Data(a), Self::Data(b)) => a.name == b.name && a.id == b.id,
            _ => true,
        }
    }

    /// # Panics
    ///
    /// Panics if this is not a data registration.
    pub fn to_management_cluster_registration(&self) -> MetaclusterRegistration {
        match self {
            Self::Data(d) => Self::Management(d.to_management_registration()),
            Self::Management(m) => panic!(
                "to_management_cluster_registration called on a management registration ({})",
                m.metacluster_name
            ),
        }
    }

    /// # Panics
    ///
    /// Panics if this is not a management registration, or if `name` or `id`
    /// equals the metacluster's.
    pub fn to_data_cluster_registration(
        &self,
        name: ClusterName,
        id: ClusterId,
    ) -> MetaclusterRegistration {
        match self {
            Self::Management(m) => Self::Data(m.to_data_registration(name, id)),
            Self::Data(d) => panic!(
                "to_data_cluster_registration called on a data registration ({})",
                d.name
            ),
        }
    }

    pub fn as_management(&self) -> Option<&ManagementRegistration> {
        match self {
            Self::Management(m) => Some(m),
            Self::Data(_) => None,
        }
    }

    pub fn as_data(&self) -> Option<&DataRegistration> {
        match self {
            Self::Data(d) => Some(d),
            Self::Management(_) => None,
        }
    }

    pub fn encode(&self) -> Bytes {
        codec::encode(self)
    }

    /// # Errors
    ///
    /// Returns [`DecodeError`] for truncated, foreign or corrupt bytes, and
    /// [`DecodeError::InvalidRecord`] for bytes that decode to an impossible
    /// registration.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        codec::decode(bytes)
    }

    /// Decodes an optional stored value. Absence means standalone.
    ///
    /// # Errors
    ///
    /// Same as [`decode`](Self::decode).
    pub fn decode_optional(bytes: Option<&[u8]>) -> Result<Option<Self>, DecodeError> {
        bytes.map(Self::decode).transpose()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "metacluster_name": self.metacluster_name().as_str(),
            "metacluster_id": self.metacluster_id().short_string(),
        });
        if let Self::Data(d) = self {
            obj["data_cluster_name"] = serde_json::Value::from(d.name.as_str());
            obj["data_cluster_id"] = serde_json::Value::from(d.id.short_string());
        }
        obj
    }
}

impl Display for MetaclusterRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "metacluster name: {}, metacluster id: {}",
            self.metacluster_name(),
            self.metacluster_id().short_string()
        )?;
        if let Self::Data(d) = self {
            write!(
                f,
                ", data cluster name: {}, data cluster id: {}",
                d.name,
                d.id.short_string()
            )?;
        }
        Ok(())
    }
}

impl From<ManagementRegistration> for MetaclusterRegistration {
    fn from(value: ManagementRegistration) -> Self {
        Self::Management(value)
    }
}

impl From<DataRegistration> for MetaclusterRegistration {
    fn from(value: DataRegistration) -> Self {
        Self::Data(value)
    }
}

// ============================================================================
// Wire Form
// ============================================================================

/// Persisted layout. The management shape stores its own identity in the
/// entity fields.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationWire {
    cluster_type: ClusterType,
    metacluster_name: ClusterName,
    name: ClusterName,
    metacluster_id: ClusterId,
    id: ClusterId,
}

impl Versioned for MetaclusterRegistration {
    const SCHEMA_ID: u32 = REGISTRATION_SCHEMA_ID;
    const RECORD: &'static str = "MetaclusterRegistration";
    type Wire = RegistrationWire;

    fn to_wire(&self) -> RegistrationWire {
        RegistrationWire {
            cluster_type: self.cluster_type(),
            metacluster_name: self.metacluster_name().clone(),
            name: self.name().clone(),
            metacluster_id: self.metacluster_id(),
            id: self.id(),
        }
    }

    fn from_wire(wire: RegistrationWire) -> Result<Self, String> {
        match wire.cluster_type {
            ClusterType::MetaclusterManagement => {
                if wire.name != wire.metacluster_name || wire.id != wire.metacluster_id {
                    return Err(format!(
                        "management registration for {} names a different cluster ({}, {})",
                        wire.metacluster_name,
                        wire.name,
                        wire.id.short_string()
                    ));
                }
                Ok(Self::management(wire.metacluster_name, wire.metacluster_id))
            }
            ClusterType::MetaclusterData => DataRegistration::try_new(
                wire.metacluster_name,
                wire.name,
                wire.metacluster_id,
                wire.id,
            )
            .map(Self::Data)
            .map_err(|e| e.to_string()),
        }
    }
}
