//! Error types for metacluster metadata.

use std::path::PathBuf;

use metacluster_types::{ClusterId, ClusterName};

use crate::data_cluster::DataClusterState;

/// Errors produced while decoding a persisted record.
///
/// These are data errors: the bytes came from a store and may be stale,
/// truncated, or written by an incompatible version. Callers must surface
/// them as read failures rather than substituting a default record.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{record}: {len} bytes is too short for the record header")]
    Truncated { record: &'static str, len: usize },

    #[error("{record}: unsupported format version {found} (supported: {supported})")]
    UnsupportedFormat {
        record: &'static str,
        found: u16,
        supported: u16,
    },

    #[error("{record}: schema id {found} does not match expected {expected}")]
    SchemaMismatch {
        record: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("{record}: malformed payload: {reason}")]
    Malformed { record: &'static str, reason: String },

    #[error("{record}: {count} trailing bytes after payload")]
    TrailingBytes { record: &'static str, count: usize },

    #[error("{record}: invalid record: {reason}")]
    InvalidRecord { record: &'static str, reason: String },
}

/// Errors from a [`MetadataStore`](crate::MetadataStore) implementation.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt store file {path}: {reason}")]
    CorruptFile { path: PathBuf, reason: String },

    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors raised when a data registration would reuse the metacluster's
/// own identity.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("data cluster name {0} is the metacluster name")]
    NameCollision(ClusterName),

    #[error("data cluster id {} is the metacluster id", .0.short_string())]
    IdCollision(ClusterId),
}

/// Error returned when parsing an unknown data cluster state name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown data cluster state {0:?}")]
pub struct ParseStateError(pub String);

/// Errors from directory and management metadata operations.
#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The local directory slot is empty.
    #[error("cluster is not registered with a metacluster")]
    NotRegistered,

    /// An incoming registration does not belong to the local metacluster.
    #[error("registration mismatch: local [{local}], incoming [{incoming}]")]
    RegistrationMismatch { local: String, incoming: String },

    /// A requested lifecycle transition is rejected by the policy in use.
    #[error("illegal data cluster state transition from {from} to {to}")]
    IllegalTransition {
        from: DataClusterState,
        to: DataClusterState,
    },

    /// Stored keys or values are inconsistent with each other.
    #[error("corrupt metadata: {0}")]
    Corrupt(String),
}
