// # Local-Storage Binding
//
// A typed value persisted as JSON under one storage key.
//
// ## Reads
//
// The stored value is read synchronously on construction. An absent key,
// a read error or a parse error yields the caller's initial value; the
// error is logged and never returned.
//
// ## Writes
//
// `SetValue::set` computes the next value against the value held at call
// time, persists it, then updates the exposed value. A failed write is
// logged and the exposed value still updates. Without a storage backend
// a write is a logged no-op.
//
// ## Cross-Context Sync
//
// Changes made by other contexts to the same key are applied:
// - new value present: parsed, a parse failure keeps the last value
// - key removed or area cleared: back to the initial value
// Changes to other keys are ignored.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::Result;
use crate::lifecycle::Lifecycle;
use crate::platform::Platform;
use crate::state::StateCell;
use crate::subscription::{Subscription, SubscriptionGuard};
use crate::traits::{StorageArea, StorageEvent, StorageListener};

/// The argument of a write: a new value, or a function of the current one
pub enum Update<T> {
    Value(T),
    With(Box<dyn FnOnce(&T) -> T>),
}

impl<T> Update<T> {
    /// Functional update
    pub fn with(f: impl FnOnce(&T) -> T + 'static) -> Self {
        Self::With(Box::new(f))
    }

    fn apply(self, current: &T) -> T {
        match self {
            Self::Value(value) => value,
            Self::With(f) => f(current),
        }
    }
}

impl<T> From<T> for Update<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

struct StorageInner<T> {
    area: Option<Rc<dyn StorageArea>>,
    key: RefCell<String>,
    initial: T,
    value: StateCell<T>,
}

impl<T: Serialize + DeserializeOwned + Clone> StorageInner<T> {
    fn read(&self, key: &str) -> T {
        let Some(area) = &self.area else {
            return self.initial.clone();
        };
        match area.get_item(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "stored value is not valid; using initial value");
                self.initial.clone()
            }),
            Ok(None) => self.initial.clone(),
            Err(e) => {
                tracing::warn!(
                    key,
                    error = %e,
                    "failed to read local storage; using initial value"
                );
                self.initial.clone()
            }
        }
    }

    fn apply_event(&self, key: &str, event: &StorageEvent) {
        match (&event.key, &event.new_value) {
            (None, _) => {
                tracing::debug!(key, "storage cleared by another context");
                self.value.set(self.initial.clone());
            }
            (Some(changed), _) if changed != key => {}
            (Some(_), Some(raw)) => match serde_json::from_str(raw) {
                Ok(value) => self.value.set(value),
                Err(e) => {
                    tracing::warn!(
                        key,
                        error = %e,
                        "ignoring unparseable value from another context"
                    )
                }
            },
            (Some(_), None) => self.value.set(self.initial.clone()),
        }
    }
}

/// Value persisted in local storage
pub struct LocalStorage<T> {
    inner: Rc<StorageInner<T>>,
    guard: SubscriptionGuard<String>,
}

impl<T: Serialize + DeserializeOwned + Clone + 'static> LocalStorage<T> {
    /// Bind `key`; the stored value (or `initial`) is readable at once
    pub fn new(platform: &Platform, key: impl Into<String>, initial: T) -> Self {
        let key = key.into();
        let area = platform.local_storage();
        if area.is_none() {
            tracing::debug!(key = %key, "no storage backend; value will not persist");
        }
        let inner = StorageInner {
            area,
            value: StateCell::new(initial.clone()),
            key: RefCell::new(key),
            initial,
        };
        let stored = inner.read(&inner.key.borrow());
        inner.value.set(stored);
        Self {
            inner: Rc::new(inner),
            guard: SubscriptionGuard::new("local-storage"),
        }
    }

    pub fn get(&self) -> T {
        self.inner.value.get()
    }

    pub fn key(&self) -> String {
        self.inner.key.borrow().clone()
    }

    pub fn version(&self) -> u64 {
        self.inner.value.version()
    }

    /// Cloneable write access
    pub fn setter(&self) -> SetValue<T> {
        SetValue {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Move to another key: re-read, and re-subscribe when active
    pub fn set_key(&mut self, key: impl Into<String>) -> Result<()> {
        let key = key.into();
        if *self.inner.key.borrow() == key {
            return Ok(());
        }
        *self.inner.key.borrow_mut() = key.clone();
        self.inner.value.set(self.inner.read(&key));
        if self.guard.is_active() {
            self.subscribe()
        } else {
            Ok(())
        }
    }

    fn subscribe(&mut self) -> Result<()> {
        let Some(area) = self.inner.area.clone() else {
            return Ok(());
        };
        let inner = Rc::downgrade(&self.inner);
        let key = self.inner.key.borrow().clone();

        self.guard.sync(key, move |key, _| {
            let key = key.clone();
            let listener: StorageListener = Rc::new(move |event: &StorageEvent| {
                if let Some(inner) = inner.upgrade() {
                    inner.apply_event(&key, event);
                }
            });
            let id = area.subscribe(listener);
            Ok(Subscription::new("storage", move || {
                area.unsubscribe(id);
            }))
        })?;
        Ok(())
    }
}

impl<T: Serialize + DeserializeOwned + Clone + 'static> Lifecycle for LocalStorage<T> {
    fn activate(&mut self) -> Result<()> {
        self.subscribe()
    }

    fn deactivate(&mut self) {
        self.guard.deactivate();
    }
}

/// Write access to a [`LocalStorage`] value
pub struct SetValue<T> {
    inner: Weak<StorageInner<T>>,
}

impl<T> Clone for SetValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Serialize + DeserializeOwned + Clone> SetValue<T> {
    fn live(&self) -> Option<(Rc<StorageInner<T>>, Rc<dyn StorageArea>)> {
        let Some(inner) = self.inner.upgrade() else {
            tracing::warn!("local storage setter used after the binding was disposed");
            return None;
        };
        let Some(area) = inner.area.clone() else {
            tracing::warn!(
                key = %inner.key.borrow(),
                "Attempted to use local storage without a storage backend"
            );
            return None;
        };
        Some((inner, area))
    }

    /// Write a new value or a function of the current one
    ///
    /// # Example
    ///
    /// ```rust
    /// use tether_core::Platform;
    /// use tether_core::bindings::{LocalStorage, Update};
    /// use tether_core::storage::MemoryStorage;
    /// use std::rc::Rc;
    ///
    /// let platform = Platform::headless().with_local_storage(Rc::new(MemoryStorage::new()));
    /// let counter = LocalStorage::new(&platform, "count", 0u32);
    /// let set = counter.setter();
    ///
    /// set.set(Update::with(|n: &u32| n + 1));
    /// set.set(Update::with(|n: &u32| n + 1));
    /// assert_eq!(counter.get(), 2);
    /// ```
    pub fn set(&self, update: impl Into<Update<T>>) {
        let Some((inner, area)) = self.live() else { return };
        let next = update.into().apply(&inner.value.get());
        let key = inner.key.borrow().clone();

        match serde_json::to_string(&next) {
            Ok(raw) => {
                if let Err(e) = area.set_item(&key, &raw) {
                    tracing::warn!(key = %key, error = %e, "failed to persist local storage value");
                }
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "value cannot be serialized; not persisted")
            }
        }
        inner.value.set(next);
    }

    /// Delete the key and return to the initial value
    pub fn remove(&self) {
        let Some((inner, area)) = self.live() else { return };
        let key = inner.key.borrow().clone();
        if let Err(e) = area.remove_item(&key) {
            tracing::warn!(key = %key, error = %e, "failed to remove local storage value");
        }
        inner.value.set(inner.initial.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mount;
    use crate::platform::MemoryPlatform;
    use crate::storage::MemoryStorage;
    use std::collections::BTreeMap;

    #[test]
    fn corrupt_stored_value_falls_back_to_initial() {
        let memory = MemoryPlatform::new();
        memory.storage.set_item("prefs", "{not json").unwrap();
        let prefs = LocalStorage::new(&memory.platform(), "prefs", vec![1, 2]);
        assert_eq!(prefs.get(), vec![1, 2]);
    }

    #[test]
    fn failed_persist_still_updates_the_value() {
        let storage = MemoryStorage::with_quota(4);
        let platform = Platform::headless().with_local_storage(Rc::new(storage.clone()));
        let name = LocalStorage::new(&platform, "name", String::new());

        name.setter().set("a much longer value".to_string());
        assert_eq!(name.get(), "a much longer value");
        assert!(storage.is_empty());
    }

    #[test]
    fn unserializable_value_is_contained() {
        let memory = MemoryPlatform::new();
        let binding: LocalStorage<BTreeMap<Vec<u8>, u8>> =
            LocalStorage::new(&memory.platform(), "bytes", BTreeMap::new());

        let mut next = BTreeMap::new();
        next.insert(vec![1], 1);
        binding.setter().set(next.clone());
        assert_eq!(binding.get(), next);
        assert_eq!(memory.storage.get_item("bytes").unwrap(), None);
    }

    #[test]
    fn without_a_backend_writes_are_ignored() {
        let binding = LocalStorage::new(&Platform::headless(), "theme", "light".to_string());
        binding.setter().set("dark".to_string());
        assert_eq!(binding.get(), "light");
    }

    #[test]
    fn other_contexts_drive_the_value() {
        let memory = MemoryPlatform::new();
        let other_tab = memory.storage.fork();
        let theme = LocalStorage::new(&memory.platform(), "theme", "light".to_string());
        let mounted = Mount::new(theme).unwrap();

        other_tab.set_item("unrelated", "1").unwrap();
        other_tab.set_item("theme", "\"dark\"").unwrap();
        assert_eq!(mounted.get(), "dark");

        other_tab.set_item("theme", "garbage").unwrap();
        assert_eq!(mounted.get(), "dark");

        other_tab.remove_item("theme").unwrap();
        assert_eq!(mounted.get(), "light");

        other_tab.set_item("theme", "\"dark\"").unwrap();
        other_tab.clear().unwrap();
        assert_eq!(mounted.get(), "light");
    }

    #[test]
    fn set_key_rereads_and_resubscribes() {
        let memory = MemoryPlatform::new();
        let other_tab = memory.storage.fork();
        memory.storage.set_item("b", "2").unwrap();
        let mut mounted = Mount::new(LocalStorage::new(&memory.platform(), "a", 0i32)).unwrap();

        mounted.set_key("b").unwrap();
        assert_eq!(mounted.get(), 2);
        assert_eq!(memory.storage.listener_count(), 1);

        other_tab.set_item("a", "9").unwrap();
        assert_eq!(mounted.get(), 2);
        other_tab.set_item("b", "3").unwrap();
        assert_eq!(mounted.get(), 3);
    }

    #[test]
    fn remove_resets_to_initial() {
        let memory = MemoryPlatform::new();
        let count = LocalStorage::new(&memory.platform(), "count", 0i32);
        count.setter().set(5i32);
        assert_eq!(memory.storage.get_item("count").unwrap().as_deref(), Some("5"));

        count.setter().remove();
        assert_eq!(count.get(), 0);
        assert_eq!(memory.storage.get_item("count").unwrap(), None);
    }
}
