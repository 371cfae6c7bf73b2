// VRV Access
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Session store backends

use crate::error::{AccessError, AccessResult};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Persisted client-side key/value store holding the session entries
pub trait SessionStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> AccessResult<Option<String>>;

    /// Write a single value
    fn set(&self, key: &str, value: &str) -> AccessResult<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> AccessResult<()>;

    /// Write several values so that either all of them land or none do
    fn set_batch(&self, entries: &[(&str, &str)]) -> AccessResult<()>;

    /// Remove several values
    fn remove_batch(&self, keys: &[&str]) -> AccessResult<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// Volatile store, used by tests and one-shot embeddings
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of the raw contents
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.read().clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> AccessResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AccessResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AccessResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn set_batch(&self, entries: &[(&str, &str)]) -> AccessResult<()> {
        let mut guard = self.entries.write();
        for (key, value) in entries {
            guard.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_batch(&self, keys: &[&str]) -> AccessResult<()> {
        let mut guard = self.entries.write();
        for key in keys {
            guard.remove(*key);
        }
        Ok(())
    }
}

/// Store backed by a JSON document on disk.
///
/// Every read goes to the file, so changes made by another process (or by a user
/// deleting the file) are observed immediately. Writes replace the file through a
/// uniquely named temporary sibling and a rename.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Open a store at the given path. The file is created lazily on first write.
    pub fn open(path: impl AsRef<Path>) -> AccessResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        debug!(path = %path.display(), "Opened file session store");
        Ok(Self { path, write_lock: Mutex::new(()) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> AccessResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| AccessError::Store {
                message: format!("Failed to parse session file {}: {}", self.path.display(), e),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> AccessResult<()> {
        let content = serde_json::to_string_pretty(entries)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // Unique sibling per write, so concurrent writers in other processes never share it
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn modify(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> AccessResult<()> {
        let _guard = self.write_lock.lock();
        let mut entries = match self.load() {
            Ok(entries) => entries,
            // A damaged document is replaced rather than blocking logout or a fresh login
            Err(e @ AccessError::Store { .. }) => {
                warn!(path = %self.path.display(), error = %e, "Replacing unreadable session file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        apply(&mut entries);
        self.persist(&entries)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> AccessResult<Option<String>> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AccessResult<()> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> AccessResult<()> {
        self.modify(|entries| {
            entries.remove(key);
        })
    }

    fn set_batch(&self, batch: &[(&str, &str)]) -> AccessResult<()> {
        self.modify(|entries| {
            for (key, value) in batch {
                entries.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn remove_batch(&self, keys: &[&str]) -> AccessResult<()> {
        self.modify(|entries| {
            for key in keys {
                entries.remove(*key);
            }
        })
    }
}
