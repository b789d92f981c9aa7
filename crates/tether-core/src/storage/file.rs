// # File Storage
//
// File-backed implementation of StorageArea with crash recovery.
//
// ## Purpose
//
// Persists local-storage values across process restarts. Several
// processes may share one file; `reload()` picks up their writes and
// announces each changed key as a StorageEvent, the same way a browser
// announces writes made by another tab.
//
// ## Crash Recovery
//
// - Atomic writes: write-then-rename
// - Automatic backup: the previous file is kept as `.backup`
// - Corruption detection: JSON validation on load
// - Recovery: falls back to the backup if the main file is corrupted
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "updated_at": "2025-01-09T12:00:00Z",
//   "items": {
//     "theme": "\"dark\""
//   }
// }
// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::platform::listeners::ListenerSet;
use crate::traits::{ListenerId, StorageArea, StorageEvent, StorageListener};
use crate::{Error, Result};

/// Storage file format version
const STORAGE_FILE_VERSION: &str = "1.0";

/// Serializable storage file format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageFileFormat {
    version: String,
    updated_at: DateTime<Utc>,
    items: BTreeMap<String, String>,
}

/// File-based storage area with crash recovery
///
/// Every mutation is written through to disk before it returns.
///
/// # Example
///
/// ```rust,no_run
/// use tether_core::storage::FileStorage;
/// use tether_core::traits::StorageArea;
///
/// fn main() -> tether_core::Result<()> {
///     let storage = FileStorage::open("/var/lib/app/storage.json")?;
///     storage.set_item("theme", "\"dark\"")?;
///     assert_eq!(storage.get_item("theme")?.as_deref(), Some("\"dark\""));
///     Ok(())
/// }
/// ```
pub struct FileStorage {
    path: PathBuf,
    items: RefCell<BTreeMap<String, String>>,
    listeners: ListenerSet<StorageEvent>,
}

impl FileStorage {
    /// Create or load a file storage area
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Try to load the existing file
    /// 3. If corruption is detected, try the backup
    /// 4. If both fail, start empty
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::storage(format!(
                        "Failed to create storage directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let items = Self::load_with_recovery(&path)?;

        Ok(Self {
            path,
            items: RefCell::new(items),
            listeners: ListenerSet::new(),
        })
    }

    /// Path of the storage file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Re-read the file and announce every key another writer changed
    ///
    /// # Returns
    ///
    /// The number of change notifications dispatched.
    pub fn reload(&self) -> Result<usize> {
        let fresh = Self::load(&self.path)?;
        let previous = self.items.replace(fresh.clone());

        let mut events = Vec::new();
        for (key, old_value) in &previous {
            match fresh.get(key) {
                None => events.push(StorageEvent::changed(key, Some(old_value.clone()), None)),
                Some(new_value) if new_value != old_value => events.push(StorageEvent::changed(
                    key,
                    Some(old_value.clone()),
                    Some(new_value.clone()),
                )),
                Some(_) => {}
            }
        }
        for (key, new_value) in &fresh {
            if !previous.contains_key(key) {
                events.push(StorageEvent::changed(key, None, Some(new_value.clone())));
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            changes = events.len(),
            "Reloaded storage file"
        );
        for event in &events {
            self.listeners.dispatch(event);
        }
        Ok(events.len())
    }

    /// Load the file, falling back to the backup on corruption
    fn load_with_recovery(path: &Path) -> Result<BTreeMap<String, String>> {
        match Self::load(path) {
            Ok(items) => {
                tracing::debug!("Loaded storage file: {} keys", items.len());
                Ok(items)
            }
            Err(Error::Serialization(reason)) => {
                tracing::warn!(
                    "Storage file appears corrupted: {}. Attempting recovery from backup.",
                    reason
                );

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("No backup file found. Starting with empty storage.");
                    return Ok(BTreeMap::new());
                }

                match Self::load(&backup_path) {
                    Ok(items) => {
                        tracing::info!("Recovered storage from backup: {} keys", items.len());
                        if let Err(e) = fs::copy(&backup_path, path) {
                            tracing::error!("Failed to restore storage file from backup: {}", e);
                        }
                        Ok(items)
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "Backup also corrupted: {}. Starting with empty storage.",
                            backup_err
                        );
                        Ok(BTreeMap::new())
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    fn load(path: &Path) -> Result<BTreeMap<String, String>> {
        if !path.exists() {
            tracing::debug!("Storage file does not exist: {}", path.display());
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            Error::storage(format!(
                "Failed to read storage file {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: StorageFileFormat = serde_json::from_str(&content).map_err(|e| {
            Error::serialization(format!(
                "Failed to parse storage file {}: {}",
                path.display(),
                e
            ))
        })?;

        if file.version != STORAGE_FILE_VERSION {
            tracing::warn!(
                "Storage file version mismatch: expected {}, got {}. \
                Attempting to load anyway.",
                STORAGE_FILE_VERSION,
                file.version
            );
        }

        Ok(file.items)
    }

    /// Write the current items atomically
    fn persist(&self) -> Result<()> {
        let file = StorageFileFormat {
            version: STORAGE_FILE_VERSION.to_string(),
            updated_at: Utc::now(),
            items: self.items.borrow().clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| Error::storage(format!("Failed to serialize storage: {}", e)))?;

        let temp_path = self.temp_path();
        {
            let mut temp = fs::File::create(&temp_path).map_err(|e| {
                Error::storage(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            temp.write_all(json.as_bytes())?;
            temp.flush()?;
        }

        if self.path.exists() {
            if let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)) {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            Error::storage(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Storage written to file: {}", self.path.display());
        Ok(())
    }

    /// Apply `mutate` and persist; in-memory items roll back if the write fails
    fn write_through(&self, mutate: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let snapshot = self.items.borrow().clone();
        {
            let mut items = self.items.borrow_mut();
            mutate(&mut *items);
        }
        if let Err(e) = self.persist() {
            self.items.replace(snapshot);
            return Err(e);
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.path)
            .field("keys", &self.len())
            .finish()
    }
}

impl StorageArea for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.write_through(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        if !self.items.borrow().contains_key(key) {
            return Ok(());
        }
        self.write_through(|items| {
            items.remove(key);
        })
    }

    fn clear(&self) -> Result<()> {
        self.write_through(|items| items.clear())
    }

    fn subscribe(&self, listener: StorageListener) -> ListenerId {
        self.listeners.add(listener)
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_persists_across_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        assert!(storage.is_empty());
        storage.set_item("theme", "\"dark\"").unwrap();
        assert!(path.exists());

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(
            reopened.get_item("theme").unwrap().as_deref(),
            Some("\"dark\"")
        );
    }

    #[test]
    fn test_file_storage_corruption_recovery() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set_item("count", "1").unwrap();
        // Second write creates the backup of the first
        storage.set_item("count", "2").unwrap();
        assert!(FileStorage::backup_path(&path).exists());

        fs::write(&path, b"corrupted json data").unwrap();

        let recovered = FileStorage::open(&path).unwrap();
        assert_eq!(recovered.get_item("count").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_reload_announces_only_changed_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let ours = FileStorage::open(&path).unwrap();
        ours.set_item("same", "1").unwrap();
        ours.set_item("changed", "1").unwrap();
        ours.set_item("removed", "1").unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        ours.subscribe(Rc::new(move |event: &StorageEvent| {
            sink.borrow_mut().push(event.clone())
        }));

        let theirs = FileStorage::open(&path).unwrap();
        theirs.set_item("changed", "2").unwrap();
        theirs.remove_item("removed").unwrap();
        theirs.set_item("added", "3").unwrap();

        assert_eq!(ours.reload().unwrap(), 3);

        let seen = seen.borrow();
        let keys: Vec<_> = seen.iter().filter_map(|e| e.key.clone()).collect();
        assert!(keys.contains(&"changed".to_string()));
        assert!(keys.contains(&"removed".to_string()));
        assert!(keys.contains(&"added".to_string()));
        assert!(!keys.contains(&"same".to_string()));
        assert_eq!(ours.get_item("added").unwrap().as_deref(), Some("3"));
    }
}
