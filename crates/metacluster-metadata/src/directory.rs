//! The per-cluster registration slot.

use metacluster_types::ClusterType;

use crate::{MetaclusterRegistration, MetadataError, MetadataStore};

/// Store key of the registration slot.
pub const REGISTRATION_KEY: &[u8] = b"metacluster/clusterRegistration";

/// Reads and writes a cluster's own [`MetaclusterRegistration`].
///
/// Each cluster has one slot. An empty slot means the cluster is standalone.
/// Writes overwrite; the caller's transaction decides which write wins.
#[derive(Debug, Clone)]
pub struct MetaclusterDirectory<S> {
    store: S,
}

impl<S: MetadataStore> MetaclusterDirectory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the registration, if any.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Store`] if the read fails and
    /// [`MetadataError::Decode`] if the stored bytes are not a valid
    /// registration.
    pub fn get(&self) -> Result<Option<MetaclusterRegistration>, MetadataError> {
        let bytes = self.store.get(REGISTRATION_KEY)?;
        MetaclusterRegistration::decode_optional(bytes.as_deref()).map_err(|e| {
            tracing::warn!(error = %e, "stored metacluster registration is unreadable");
            MetadataError::Decode(e)
        })
    }

    pub fn set(&self, registration: &MetaclusterRegistration) -> Result<(), MetadataError> {
        self.store.set(REGISTRATION_KEY, registration.encode())?;
        tracing::info!(
            cluster_type = %registration.cluster_type(),
            metacluster = %registration.metacluster_name(),
            name = %registration.name(),
            id = %registration.id().short_string(),
            "stored metacluster registration"
        );
        Ok(())
    }

    /// Empties the slot, returning the cluster to standalone.
    pub fn clear(&self) -> Result<(), MetadataError> {
        self.store.clear(REGISTRATION_KEY)?;
        tracing::info!("cleared metacluster registration");
        Ok(())
    }

    /// Returns the cluster's role, or `None` for a standalone cluster.
    pub fn cluster_type(&self) -> Result<Option<ClusterType>, MetadataError> {
        Ok(self.get()?.map(|r| r.cluster_type()))
    }

    /// Checks that `incoming` belongs to the same metacluster as the local
    /// registration and returns the local registration.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::NotRegistered`] if the slot is empty and
    /// [`MetadataError::RegistrationMismatch`] if the registrations do not
    /// match.
    pub fn verify(
        &self,
        incoming: &MetaclusterRegistration,
    ) -> Result<MetaclusterRegistration, MetadataError> {
        let local = self.get()?.ok_or(MetadataError::NotRegistered)?;
        if !local.matches(incoming) {
            tracing::warn!(local = %local, incoming = %incoming, "metacluster registration mismatch");
            return Err(MetadataError::RegistrationMismatch {
                local: local.to_string(),
                incoming: incoming.to_string(),
            });
        }
        Ok(local)
    }
}
