//! Key-value state store for the handful of files that survive between runs
//!
//! The collector only ever needs whole-value reads and whole-value writes,
//! so a store is just `read(key)` / `write(key, contents)`. Typed access goes
//! through [`StateStoreExt`], which treats unreadable or corrupt entries as
//! absent so a damaged cache file triggers a fresh start instead of an error.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::CollectorError;

/// Raw persistent storage keyed by name
pub trait StateStore: Send + Sync {
    /// Returns `None` when nothing is stored under `key`
    fn read(&self, key: &str) -> Result<Option<String>, CollectorError>;

    /// Replaces whatever is stored under `key`
    fn write(&self, key: &str, contents: &str) -> Result<(), CollectorError>;
}

/// Typed JSON access on top of any [`StateStore`]
pub trait StateStoreExt: StateStore {
    /// Load a value; missing, unreadable and unparseable entries are `None`
    #[tracing::instrument(name = "load_state", level = "debug", skip(self))]
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("Key not found");
                return None;
            }
            Err(e) => {
                tracing::warn!("Could not read state, treating as absent: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Corrupt state entry, treating as absent: {}", e);
                None
            }
        }
    }

    /// Serialize and store a value
    #[tracing::instrument(name = "save_state", level = "debug", skip(self, value))]
    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CollectorError> {
        let contents = serde_json::to_string_pretty(value)?;
        self.write(key, &contents)
    }
}

impl<S: StateStore + ?Sized> StateStoreExt for S {}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CollectorError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// File backing `key`
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStore for JsonFileStore {
    fn read(&self, key: &str) -> Result<Option<String>, CollectorError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), CollectorError> {
        write_file_atomically(&self.path_for(key), contents)
    }
}

/// Write the full contents to a sibling temp file, then rename over `path`
pub fn write_file_atomically(path: &Path, contents: &str) -> Result<(), CollectorError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Volatile store used by tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry with raw contents, corrupt or not
    pub fn insert_raw(&self, key: &str, contents: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), contents.to_string());
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }
}

impl StateStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, CollectorError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CollectorError::store("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), CollectorError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CollectorError::store("memory store lock poisoned"))?;
        entries.insert(key.to_string(), contents.to_string());
        Ok(())
    }
}
