//! Data cluster state transitions.
//!
//! [`DataClusterEntry`](crate::DataClusterEntry) accepts any state. Callers
//! that change state pick a [`TransitionPolicy`] and check the change with
//! [`check_transition`] inside the same transaction as the write.

use crate::{DataClusterState, MetadataError};

/// Decides which state changes are legal.
pub trait TransitionPolicy {
    fn allows(&self, from: DataClusterState, to: DataClusterState) -> bool;
}

/// The standard lifecycle.
///
/// ```text
/// Ready ──► Removing
///   │ ▲
///   ▼ │
/// Restoring
/// ```
///
/// A removing cluster never comes back; it is deleted once drained.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTransitionPolicy;

impl TransitionPolicy for DefaultTransitionPolicy {
    fn allows(&self, from: DataClusterState, to: DataClusterState) -> bool {
        use DataClusterState::{Ready, Removing, Restoring};

        from == to || matches!((from, to), (Ready, Removing | Restoring) | (Restoring, Ready))
    }
}

impl<F> TransitionPolicy for F
where
    F: Fn(DataClusterState, DataClusterState) -> bool,
{
    fn allows(&self, from: DataClusterState, to: DataClusterState) -> bool {
        self(from, to)
    }
}

/// # Errors
///
/// Returns [`MetadataError::IllegalTransition`] if `policy` rejects the
/// change.
pub fn check_transition<P: TransitionPolicy + ?Sized>(
    policy: &P,
    from: DataClusterState,
    to: DataClusterState,
) -> Result<(), MetadataError> {
    if policy.allows(from, to) {
        Ok(())
    } else {
        tracing::debug!(%from, %to, "rejected data cluster state transition");
        Err(MetadataError::IllegalTransition { from, to })
    }
}
