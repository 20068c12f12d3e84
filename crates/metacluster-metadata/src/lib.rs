//! metacluster-metadata: Persisted metadata for a metacluster
//!
//! A metacluster is one management cluster plus any number of data clusters.
//! This crate holds the records that describe that arrangement and the code
//! that stores them:
//!
//! - [`DataClusterEntry`]: the management cluster's record of a data cluster
//!   (id, capacity, allocation, lifecycle state).
//! - [`MetaclusterRegistration`]: the membership record every cluster keeps
//!   in its own [`MetaclusterDirectory`] slot.
//! - [`ManagementClusterMetadata`]: the management cluster's data cluster map.
//!
//! Records persist through a versioned codec (see [`codec`]) on any
//! [`MetadataStore`].
//!
//! # Example
//!
//! ```
//! use metacluster_metadata::{MemoryStore, MetaclusterDirectory, MetaclusterRegistration};
//! use metacluster_types::{ClusterId, ClusterName, ClusterType};
//!
//! let store = MemoryStore::new();
//! let directory = MetaclusterDirectory::new(&store);
//! assert_eq!(directory.cluster_type().unwrap(), None);
//!
//! let management = MetaclusterRegistration::management(
//!     ClusterName::new("mc").unwrap(),
//!     ClusterId::generate(),
//! );
//! directory.set(&management).unwrap();
//!
//! let data = management.to_data_cluster_registration(
//!     ClusterName::new("dc1").unwrap(),
//!     ClusterId::generate(),
//! );
//! assert!(data.matches(&management));
//! assert_eq!(
//!     directory.cluster_type().unwrap(),
//!     Some(ClusterType::MetaclusterManagement)
//! );
//! ```

pub mod codec;
pub mod consistency;
mod data_cluster;
mod directory;
mod error;
mod lifecycle;
mod management;
mod registration;
mod store;

pub use consistency::{
    ConsistencyError, validate_data_cluster_registration, validate_management_cluster,
    validate_management_registration,
};
pub use data_cluster::{DATA_CLUSTER_ENTRY_SCHEMA_ID, DataClusterEntry, DataClusterState};
pub use directory::{MetaclusterDirectory, REGISTRATION_KEY};
pub use error::{DecodeError, MetadataError, ParseStateError, RegistrationError, StoreError};
pub use lifecycle::{DefaultTransitionPolicy, TransitionPolicy, check_transition};
pub use management::{
    DATA_CLUSTER_CONNECTION_PREFIX, DATA_CLUSTER_METADATA_PREFIX, DataClusterMetadata,
    ManagementClusterMetadata, MetaclusterMetrics, metacluster_capacity,
};
pub use registration::{
    DataRegistration, ManagementRegistration, MetaclusterRegistration, REGISTRATION_SCHEMA_ID,
    RegistrationWire,
};
pub use store::{FileStore, MemoryStore, MetadataStore};
