//! Durable storage for the persisted portion of the library.
//!
//! A backend stores one opaque text record per namespace. The library keeps
//! its books and bookcases under [`DEFAULT_NAMESPACE`]; nothing else is ever
//! written.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::StorageError;

/// Fixed namespace of the persisted library record.
pub const DEFAULT_NAMESPACE: &str = "virtual-library-storage";

/// Storage backend for keyed text records.
///
/// Implementations must be thread-safe and replace a record atomically: a
/// reader sees either the previous record or the new one, never a mix.
pub trait StateStorage: Send + Sync {
    /// Read the record stored under `namespace`.
    ///
    /// Returns `Ok(None)` if nothing has been saved yet.
    fn load(&self, namespace: &str) -> Result<Option<String>, StorageError>;

    /// Create or replace the record under `namespace`.
    fn save(&self, namespace: &str, record: &str) -> Result<(), StorageError>;

    /// Remove the record. Returns `true` if one existed.
    fn clear(&self, namespace: &str) -> Result<bool, StorageError>;
}

impl<T: StateStorage + ?Sized> StateStorage for Arc<T> {
    fn load(&self, namespace: &str) -> Result<Option<String>, StorageError> {
        (**self).load(namespace)
    }

    fn save(&self, namespace: &str, record: &str) -> Result<(), StorageError> {
        (**self).save(namespace, record)
    }

    fn clear(&self, namespace: &str) -> Result<bool, StorageError> {
        (**self).clear(namespace)
    }
}

/// In-memory storage for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct InMemoryStateStorage {
    records: RwLock<HashMap<String, String>>,
}

impl InMemoryStateStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for InMemoryStateStorage {
    fn load(&self, namespace: &str) -> Result<Option<String>, StorageError> {
        let records = self
            .records
            .read()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        Ok(records.get(namespace).cloned())
    }

    fn save(&self, namespace: &str, record: &str) -> Result<(), StorageError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        records.insert(namespace.to_string(), record.to_string());
        Ok(())
    }

    fn clear(&self, namespace: &str) -> Result<bool, StorageError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        Ok(records.remove(namespace).is_some())
    }
}

/// File-backed storage: each namespace is `<root>/<namespace>.json`.
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the record, so a crash mid-write leaves the old record.
#[derive(Debug, Clone)]
pub struct FileStateStorage {
    root: PathBuf,
}

impl FileStateStorage {
    /// Open storage rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record for `namespace`.
    pub fn record_path(&self, namespace: &str) -> PathBuf {
        self.root.join(format!("{namespace}.json"))
    }
}

impl StateStorage for FileStateStorage {
    fn load(&self, namespace: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.record_path(namespace)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, namespace: &str, record: &str) -> Result<(), StorageError> {
        let path = self.record_path(namespace);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(record.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StorageError::Io(e.error))?;
        debug!(path = %path.display(), bytes = record.len(), "library record saved");
        Ok(())
    }

    fn clear(&self, namespace: &str) -> Result<bool, StorageError> {
        match fs::remove_file(self.record_path(namespace)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
