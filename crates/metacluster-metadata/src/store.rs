//! Key-value stores backing the metadata.
//!
//! The metadata layer only needs point reads, point writes, and ordered
//! prefix scans. Each operation is atomic for a single key; multi-key
//! atomicity is the caller's transaction engine's concern.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::StoreError;

/// A byte-keyed metadata store.
pub trait MetadataStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>, StoreError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &[u8], value: Bytes) -> Result<(), StoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn clear(&self, key: &[u8]) -> Result<(), StoreError>;

    /// Returns every pair whose key starts with `prefix`, ordered by key.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Bytes)>, StoreError>;
}

impl<S: MetadataStore + ?Sized> MetadataStore for &S {
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &[u8], value: Bytes) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn clear(&self, key: &[u8]) -> Result<(), StoreError> {
        (**self).clear(key)
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Bytes)>, StoreError> {
        (**self).scan_prefix(prefix)
    }
}

impl<S: MetadataStore + ?Sized> MetadataStore for Arc<S> {
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &[u8], value: Bytes) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn clear(&self, key: &[u8]) -> Result<(), StoreError> {
        (**self).clear(key)
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Bytes)>, StoreError> {
        (**self).scan_prefix(prefix)
    }
}

// ============================================================================
// Memory Store
// ============================================================================

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<Vec<u8>, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetadataStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &[u8], value: Bytes) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_vec(), value);
        Ok(())
    }

    fn clear(&self, key: &[u8]) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Bytes)>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}

// ============================================================================
// File Store
// ============================================================================

const ENTRY_EXTENSION: &str = "entry";

/// On-disk form of one entry. The key is kept in the file because file
/// names are digests.
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    key: Vec<u8>,
    value: Vec<u8>,
}

/// Directory-backed store with one file per key.
///
/// Files are named by the BLAKE3 digest of their key. Each write goes to a
/// fresh temporary file which is fsynced and then renamed over the entry, so
/// a crash or a concurrent writer leaves either the old or the new value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        tracing::debug!(dir = %dir.display(), "opened file store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &[u8]) -> PathBuf {
        let digest = blake3::hash(key);
        self.dir.join(format!("{}.{ENTRY_EXTENSION}", digest.to_hex()))
    }

    fn read_entry(path: &Path) -> Result<Option<StoredEntry>, StoreError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        postcard::from_bytes(&bytes)
            .map(Some)
            .map_err(|e| StoreError::CorruptFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

impl MetadataStore for FileStore {
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>, StoreError> {
        let path = self.entry_path(key);
        match Self::read_entry(&path)? {
            Some(entry) if entry.key == key => Ok(Some(Bytes::from(entry.value))),
            Some(_) => Err(StoreError::CorruptFile {
                path,
                reason: "stored key does not match file name".to_string(),
            }),
            None => Ok(None),
        }
    }

    fn set(&self, key: &[u8], value: Bytes) -> Result<(), StoreError> {
        let path = self.entry_path(key);

        let entry = StoredEntry {
            key: key.to_vec(),
            value: value.to_vec(),
        };
        let encoded = postcard::to_allocvec(&entry).map_err(|e| StoreError::CorruptFile {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        // Each write gets its own temp file so concurrent writers of one key
        // never share a partially written file.
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_at(&self.dir))?;
        tmp.write_all(&encoded).map_err(io_at(tmp.path()))?;
        tmp.as_file().sync_all().map_err(io_at(tmp.path()))?;
        tmp.persist(&path).map_err(|e| StoreError::Io {
            path: path.clone(),
            source: e.error,
        })?;

        tracing::trace!(path = %path.display(), len = value.len(), "wrote store entry");
        Ok(())
    }

    fn clear(&self, key: &[u8]) -> Result<(), StoreError> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Bytes)>, StoreError> {
        let read_dir = fs::read_dir(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut found = BTreeMap::new();
        for dirent in read_dir {
            let dirent = dirent.map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = dirent.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            if let Some(entry) = Self::read_entry(&path)?
                && entry.key.starts_with(prefix)
            {
                found.insert(entry.key, Bytes::from(entry.value));
            }
        }
        Ok(found.into_iter().collect())
    }
}

fn io_at(path: &Path) -> impl FnOnce(io::Error) -> StoreError + use<> {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}
