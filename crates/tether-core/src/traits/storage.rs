// # Storage Area Trait
//
// Defines the interface for a key/value string store with change
// notifications, shaped after the browser's `localStorage`.
//
// ## Notifications
//
// A write made through one storage context is announced to every
// *other* context sharing the same backing data. The writer itself is
// never notified. `StorageEvent::key == None` means the whole area was
// cleared.
//
// ## Implementations
//
// - `MemoryStorage`: in-process, forkable into sibling contexts
// - `FileStorage`: JSON file with crash recovery and `reload()`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use super::event_target::ListenerId;
use crate::Result;

/// A change made to a storage area by another context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEvent {
    /// Changed key, `None` when the area was cleared
    pub key: Option<String>,
    /// Value before the change
    pub old_value: Option<String>,
    /// Value after the change, `None` when the key was removed
    pub new_value: Option<String>,
    /// When the change was observed
    pub at: DateTime<Utc>,
}

impl StorageEvent {
    /// Create a change notification for one key
    pub fn changed(
        key: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        Self {
            key: Some(key.into()),
            old_value,
            new_value,
            at: Utc::now(),
        }
    }

    /// Create a notification that the whole area was cleared
    pub fn cleared() -> Self {
        Self {
            key: None,
            old_value: None,
            new_value: None,
            at: Utc::now(),
        }
    }
}

/// Storage change listener
pub type StorageListener = Rc<dyn Fn(&StorageEvent)>;

/// Trait for storage area implementations
pub trait StorageArea {
    /// Read the raw string stored under `key`
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`
    ///
    /// # Errors
    ///
    /// Fails when the backend refuses the write (quota, I/O).
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Remove every key
    fn clear(&self) -> Result<()>;

    /// Register a listener for changes made by other contexts
    fn subscribe(&self, listener: StorageListener) -> ListenerId;

    /// Remove a change listener; unknown ids return `false`
    fn unsubscribe(&self, id: ListenerId) -> bool;
}
