//! # metacluster-types: Core types for the metacluster
//!
//! This crate contains the leaf value types shared by every metacluster
//! component:
//! - Identity ([`ClusterId`], [`ClusterName`])
//! - Capacity accounting ([`ClusterUsage`])
//! - Cluster roles ([`ClusterType`])
//!
//! Nothing here touches storage. Records built from these values, and their
//! persisted encoding, live in `metacluster-metadata`.

use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Cluster Identity - Copy (16-byte value)
// ============================================================================

/// Unique identifier for a cluster or for the metacluster itself.
///
/// Ids are opaque. They are generated once, when a cluster joins (or a
/// metacluster is created), and never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterId(Uuid);

impl ClusterId {
    /// The all-zero id. Used for entries whose id has not been assigned yet.
    pub const NIL: ClusterId = ClusterId(Uuid::nil());

    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    pub fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Returns the first 8 bytes as 16 lowercase hex digits.
    ///
    /// This is the form used in log lines and registration summaries.
    ///
    /// # Examples
    ///
    /// ```
    /// # use metacluster_types::ClusterId;
    /// let id = ClusterId::from_u128(0x0123_4567_89ab_cdef_0000_0000_0000_0001);
    /// assert_eq!(id.short_string(), "0123456789abcdef");
    /// ```
    pub fn short_string(&self) -> String {
        format!("{:016x}", self.0.as_u128() >> 64)
    }
}

impl Debug for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClusterId({})", self.short_string())
    }
}

impl Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ClusterId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| IdParseError(format!("{s:?}: {e}")))
    }
}

impl From<Uuid> for ClusterId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<ClusterId> for Uuid {
    fn from(id: ClusterId) -> Self {
        id.0
    }
}

/// Error returned when a string is not a valid [`ClusterId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid cluster id {0}")]
pub struct IdParseError(String);

// ============================================================================
// Cluster Name - Clone (contains String)
// ============================================================================

/// Maximum length of a cluster name in bytes.
pub const MAX_CLUSTER_NAME_LEN: usize = 255;

/// Names starting with this character are reserved for system use.
pub const SYSTEM_NAME_PREFIX: char = '\u{ff}';

/// Name of a data cluster or of a metacluster.
///
/// Names are embedded in store keys under `/`-separated prefixes, so they
/// are validated on construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClusterName(String);

impl ClusterName {
    /// Creates a validated cluster name.
    ///
    /// # Errors
    ///
    /// Returns [`NameError`] if the name is empty, longer than
    /// [`MAX_CLUSTER_NAME_LEN`] bytes, starts with [`SYSTEM_NAME_PREFIX`], or
    /// contains `/`.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.len() > MAX_CLUSTER_NAME_LEN {
            return Err(NameError::TooLong {
                len: name.len(),
                max: MAX_CLUSTER_NAME_LEN,
            });
        }
        if name.starts_with(SYSTEM_NAME_PREFIX) {
            return Err(NameError::Reserved(name));
        }
        if name.contains('/') {
            return Err(NameError::Separator(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl Display for ClusterName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClusterName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ClusterName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClusterName> for String {
    fn from(value: ClusterName) -> Self {
        value.0
    }
}

impl AsRef<str> for ClusterName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors from [`ClusterName::new`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("cluster name must not be empty")]
    Empty,

    #[error("cluster name is {len} bytes, maximum is {max}")]
    TooLong { len: usize, max: usize },

    #[error("cluster name {0:?} uses the reserved system prefix")]
    Reserved(String),

    #[error("cluster name {0:?} must not contain '/'")]
    Separator(String),
}

// ============================================================================
// Cluster Usage - Copy (single counter)
// ============================================================================

/// Capacity or allocation of a data cluster, counted in tenant groups.
///
/// The same type is used for the capacity ceiling and for the live
/// allocation so the two can be compared directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct ClusterUsage {
    pub num_tenant_groups: u64,
}

impl ClusterUsage {
    pub const ZERO: ClusterUsage = ClusterUsage {
        num_tenant_groups: 0,
    };

    pub fn new(num_tenant_groups: u64) -> Self {
        Self { num_tenant_groups }
    }

    /// Adds two usages, clamping at `u64::MAX`.
    pub fn saturating_add(self, other: ClusterUsage) -> Self {
        Self::new(self.num_tenant_groups.saturating_add(other.num_tenant_groups))
    }

    /// Structured form for admin tooling.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "num_tenant_groups": self.num_tenant_groups })
    }
}

impl Display for ClusterUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NumTenantGroups: {}", self.num_tenant_groups)
    }
}

impl From<u64> for ClusterUsage {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// Cluster Type - Copy (two-variant role tag)
// ============================================================================

/// The role a cluster plays in a metacluster.
///
/// A cluster that is not part of any metacluster has no `ClusterType`;
/// callers model that as `Option<ClusterType>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterType {
    /// Holds the authoritative data cluster records.
    MetaclusterManagement,
    /// Hosts tenant data on behalf of the management cluster.
    MetaclusterData,
}

impl ClusterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterType::MetaclusterManagement => "metacluster_management",
            ClusterType::MetaclusterData => "metacluster_data",
        }
    }
}

impl Display for ClusterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders an optional cluster type, where `None` means standalone.
pub fn cluster_type_to_string(cluster_type: Option<ClusterType>) -> &'static str {
    cluster_type.map_or("standalone", |t| t.as_str())
}

#[cfg(test)]
mod tests;
