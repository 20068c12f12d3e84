//! Cross-cluster consistency checks.
//!
//! These compare what the management cluster records against what each
//! cluster holds in its own registration slot. They run from admin tooling
//! and tests; each returns the first violation found.

use std::collections::BTreeMap;

use metacluster_types::{ClusterId, ClusterName, ClusterType};

use crate::{DataClusterEntry, DataClusterMetadata, MetaclusterRegistration};

/// A disagreement between stored registrations and cluster records.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("management cluster has no metacluster registration")]
    ManagementNotRegistered,

    #[error("expected a {expected} registration, found {found}")]
    WrongClusterType {
        expected: ClusterType,
        found: ClusterType,
    },

    #[error("{count} data clusters exceeds the limit of {max}")]
    TooManyDataClusters { count: usize, max: usize },

    #[error("data cluster {0} has no metacluster registration")]
    DataClusterNotRegistered(ClusterName),

    #[error("data cluster {name} belongs to metacluster {found}, expected {expected}")]
    ForeignMetacluster {
        name: ClusterName,
        expected: String,
        found: String,
    },

    #[error("data cluster registered as {found} is recorded as {expected}")]
    NameMismatch {
        expected: ClusterName,
        found: ClusterName,
    },

    #[error("data cluster {name} has id {}, recorded id is {}", .found.short_string(), .expected.short_string())]
    IdMismatch {
        name: ClusterName,
        expected: ClusterId,
        found: ClusterId,
    },
}

/// Checks that the management cluster's own slot holds a management
/// registration, and returns it.
pub fn validate_management_registration(
    registration: Option<&MetaclusterRegistration>,
) -> Result<&MetaclusterRegistration, ConsistencyError> {
    let registration = registration.ok_or(ConsistencyError::ManagementNotRegistered)?;
    match registration.cluster_type() {
        ClusterType::MetaclusterManagement => Ok(registration),
        found => Err(ConsistencyError::WrongClusterType {
            expected: ClusterType::MetaclusterManagement,
            found,
        }),
    }
}

/// Checks the management registration and the size of the cluster map, and
/// returns the registration.
pub fn validate_management_cluster<'a>(
    registration: Option<&'a MetaclusterRegistration>,
    clusters: &BTreeMap<ClusterName, DataClusterMetadata>,
    max_data_clusters: usize,
) -> Result<&'a MetaclusterRegistration, ConsistencyError> {
    let registration = validate_management_registration(registration).inspect_err(|e| {
        tracing::warn!(error = %e, "management registration check failed");
    })?;

    if clusters.len() > max_data_clusters {
        tracing::warn!(
            metacluster = %registration.metacluster_name(),
            count = clusters.len(),
            max = max_data_clusters,
            "too many data clusters"
        );
        return Err(ConsistencyError::TooManyDataClusters {
            count: clusters.len(),
            max: max_data_clusters,
        });
    }
    Ok(registration)
}

/// Checks one data cluster's slot against the management cluster's record
/// of it.
pub fn validate_data_cluster_registration(
    management: &MetaclusterRegistration,
    name: &ClusterName,
    entry: &DataClusterEntry,
    data_registration: Option<&MetaclusterRegistration>,
) -> Result<(), ConsistencyError> {
    let result = check_data_cluster(management, name, entry, data_registration);
    if let Err(e) = &result {
        tracing::warn!(cluster = %name, error = %e, "data cluster registration check failed");
    }
    result
}

fn check_data_cluster(
    management: &MetaclusterRegistration,
    name: &ClusterName,
    entry: &DataClusterEntry,
    data_registration: Option<&MetaclusterRegistration>,
) -> Result<(), ConsistencyError> {
    let registration =
        data_registration.ok_or_else(|| ConsistencyError::DataClusterNotRegistered(name.clone()))?;

    let data = registration
        .as_data()
        .ok_or_else(|| ConsistencyError::WrongClusterType {
            expected: ClusterType::MetaclusterData,
            found: registration.cluster_type(),
        })?;

    if !registration.matches(management) {
        return Err(ConsistencyError::ForeignMetacluster {
            name: name.clone(),
            expected: format!(
                "{} ({})",
                management.metacluster_name(),
                management.metacluster_id().short_string()
            ),
            found: format!(
                "{} ({})",
                data.metacluster_name(),
                data.metacluster_id().short_string()
            ),
        });
    }

    if data.name() != name {
        return Err(ConsistencyError::NameMismatch {
            expected: name.clone(),
            found: data.name().clone(),
        });
    }

    if data.id() != entry.id {
        return Err(ConsistencyError::IdMismatch {
            name: name.clone(),
            expected: entry.id,
            found: data.id(),
        });
    }
    Ok(())
}
