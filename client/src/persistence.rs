//! Persistence adapter.
//!
//! Both collections are stored as JSON arrays under the keys `todos` and
//! `trash` of a string key-value store, the same layout a browser keeps in
//! its local storage.

use crate::types::{TodoItem, TodoList, Trash};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Key of the active collection
pub const TODOS_KEY: &str = "todos";

/// Key of the trash collection
pub const TRASH_KEY: &str = "trash";

/// Errors raised while reading or writing persisted state
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The underlying storage could not be read or written
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data is not a valid collection
    #[error("stored data is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The write does not fit into the storage quota
    #[error("quota exceeded writing '{key}': {needed} bytes needed, quota is {quota}")]
    QuotaExceeded {
        /// Key being written
        key: String,
        /// Total bytes the store would hold after the write
        needed: usize,
        /// Configured limit
        quota: usize,
    },
}

/// Durable string key-value store
pub trait KeyValueStore: Send + Sync {
    /// Reads the value under `key`; `Ok(None)` when the key was never written
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Writes `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written or is full.
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// In-process storage, optionally limited to a number of bytes
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Unlimited storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage holding at most `quota` bytes of keys and values
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Arc::default(),
            quota: Some(quota),
        }
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(quota) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(PersistenceError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens (and creates if needed) the data directory
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The data directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        // Write-then-rename so a crash never leaves a half-written file behind
        let target = self.path_for(key);
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&staging, value)?;
        std::fs::rename(&staging, &target)?;
        Ok(())
    }
}

/// Saves and loads both collections
#[derive(Clone)]
pub struct Persistence {
    storage: Arc<dyn KeyValueStore>,
}

impl Persistence {
    /// Wraps a key-value store
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Writes both collections
    ///
    /// `todos` is written first. If the `trash` write then fails, the previous
    /// `todos` value is written back, so storage never holds the new active
    /// list next to the old trash (an item moved between them would be in
    /// neither).
    ///
    /// # Errors
    ///
    /// Returns the first storage or serialization failure. Nothing is written
    /// when either collection fails to serialize.
    #[tracing::instrument(skip_all, fields(todos = todos.len(), trash = trash.len()))]
    pub fn save(&self, todos: &TodoList, trash: &Trash) -> Result<(), PersistenceError> {
        let todos_json = serde_json::to_string(todos)?;
        let trash_json = serde_json::to_string(trash)?;

        let previous = self.storage.get(TODOS_KEY)?;
        self.storage.set(TODOS_KEY, &todos_json)?;

        if let Err(error) = self.storage.set(TRASH_KEY, &trash_json) {
            let previous = previous.as_deref().unwrap_or("[]");
            match self.storage.set(TODOS_KEY, previous) {
                Ok(()) => tracing::warn!(%error, "Trash write failed, todos rolled back"),
                Err(rollback) => {
                    tracing::error!(%error, %rollback, "Trash write failed and todos could not be rolled back");
                },
            }
            return Err(error);
        }

        tracing::debug!("Saved todo collections");
        Ok(())
    }

    /// Reads both collections; absent keys load as empty collections
    ///
    /// An id found in both collections stays active and its trash copy is
    /// dropped, as is any repeated id within one collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or holds corrupt data.
    pub fn load(&self) -> Result<(TodoList, Trash), PersistenceError> {
        let todos = self.read_items(TODOS_KEY)?;
        let trash = self.read_items(TRASH_KEY)?;

        let mut seen = HashSet::new();
        let mut dropped = 0_usize;
        let mut keep_first = |items: Vec<TodoItem>| -> Vec<TodoItem> {
            items
                .into_iter()
                .filter(|item| {
                    let fresh = seen.insert(item.id);
                    if !fresh {
                        dropped += 1;
                    }
                    fresh
                })
                .collect()
        };
        let todos = TodoList::from(keep_first(todos));
        let trash = Trash::from(keep_first(trash));

        if dropped > 0 {
            tracing::warn!(dropped, "Dropped stored todos with a duplicate id");
        }
        tracing::debug!(todos = todos.len(), trash = trash.len(), "Loaded todo collections");
        Ok((todos, trash))
    }

    fn read_items(&self, key: &str) -> Result<Vec<TodoItem>, PersistenceError> {
        match self.storage.get(key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}
