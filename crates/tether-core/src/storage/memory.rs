// # Memory Storage
//
// In-memory implementation of StorageArea.
//
// ## Purpose
//
// Provides a fast, non-persistent storage area for tests and headless
// embeddings. Handles can be forked into sibling contexts that share the
// same backing data, which is how two browser tabs see one
// `localStorage`: a write through one context notifies every other
// context, never the writer.
//
// ## Failure Injection
//
// An optional byte quota makes `set_item` fail once the stored keys and
// values would exceed it, the way a full browser store does.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::platform::listeners::ListenerSet;
use crate::traits::{ListenerId, StorageArea, StorageEvent, StorageListener};
use crate::{Error, Result};

/// Backing data shared by every context forked from one store
struct Backing {
    items: RefCell<BTreeMap<String, String>>,
    quota: Cell<Option<usize>>,
    contexts: RefCell<Vec<(u64, Weak<ListenerSet<StorageEvent>>)>>,
    next_context: Cell<u64>,
}

impl Backing {
    fn used_bytes_with(&self, key: &str, value: &str) -> usize {
        self.items
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + value.len()
    }

    fn register(&self, listeners: &Rc<ListenerSet<StorageEvent>>) -> u64 {
        let context = self.next_context.get();
        self.next_context.set(context + 1);
        let mut contexts = self.contexts.borrow_mut();
        contexts.retain(|(_, weak)| weak.strong_count() > 0);
        contexts.push((context, Rc::downgrade(listeners)));
        context
    }

    /// Deliver `event` to every live context except `origin`
    fn broadcast(&self, origin: u64, event: &StorageEvent) {
        let targets: Vec<_> = self
            .contexts
            .borrow()
            .iter()
            .filter(|(context, _)| *context != origin)
            .filter_map(|(_, weak)| weak.upgrade())
            .collect();
        for listeners in targets {
            listeners.dispatch(event);
        }
    }
}

/// In-memory storage context
///
/// Cloning yields another handle to the *same* context; use
/// [`MemoryStorage::fork`] for a sibling context.
///
/// # Example
///
/// ```rust
/// use tether_core::storage::MemoryStorage;
/// use tether_core::traits::StorageArea;
///
/// let tab_a = MemoryStorage::new();
/// let tab_b = tab_a.fork();
///
/// tab_a.set_item("theme", "\"dark\"").unwrap();
/// assert_eq!(tab_b.get_item("theme").unwrap().as_deref(), Some("\"dark\""));
/// ```
#[derive(Clone)]
pub struct MemoryStorage {
    context: u64,
    backing: Rc<Backing>,
    listeners: Rc<ListenerSet<StorageEvent>>,
}

impl MemoryStorage {
    /// Create a new empty store with one context
    pub fn new() -> Self {
        let backing = Rc::new(Backing {
            items: RefCell::new(BTreeMap::new()),
            quota: Cell::new(None),
            contexts: RefCell::new(Vec::new()),
            next_context: Cell::new(1),
        });
        Self::attach(backing)
    }

    /// Create a store that rejects writes beyond `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        let store = Self::new();
        store.set_quota(Some(bytes));
        store
    }

    fn attach(backing: Rc<Backing>) -> Self {
        let listeners = Rc::new(ListenerSet::new());
        let context = backing.register(&listeners);
        Self {
            context,
            backing,
            listeners,
        }
    }

    /// Open a sibling context over the same data
    pub fn fork(&self) -> Self {
        Self::attach(self.backing.clone())
    }

    /// Change the quota shared by all contexts
    pub fn set_quota(&self, bytes: Option<usize>) {
        self.backing.quota.set(bytes);
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.backing.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.backing.items.borrow().is_empty()
    }

    /// Number of change listeners registered on this context
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("context", &self.context)
            .field("keys", &self.len())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl StorageArea for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.backing.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.backing.quota.get() {
            let needed = self.backing.used_bytes_with(key, value);
            if needed > quota {
                return Err(Error::storage(format!(
                    "Quota exceeded writing '{}': {} of {} bytes",
                    key, needed, quota
                )));
            }
        }

        let old_value = self
            .backing
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());

        tracing::trace!(key, context = self.context, "memory storage write");
        let event = StorageEvent::changed(key, old_value, Some(value.to_string()));
        self.backing.broadcast(self.context, &event);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let old_value = self.backing.items.borrow_mut().remove(key);
        if old_value.is_some() {
            let event = StorageEvent::changed(key, old_value, None);
            self.backing.broadcast(self.context, &event);
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let had_items = !self.backing.items.borrow().is_empty();
        self.backing.items.borrow_mut().clear();
        if had_items {
            self.backing
                .broadcast(self.context, &StorageEvent::cleared());
        }
        Ok(())
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

    fn recording(store: &MemoryStorage) -> Rc<RefCell<Vec<StorageEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(Rc::new(move |event: &StorageEvent| {
            sink.borrow_mut().push(event.clone())
        }));
        seen
    }

    #[test]
    fn writer_is_not_notified_but_siblings_are() {
        let tab_a = MemoryStorage::new();
        let tab_b = tab_a.fork();
        let seen_a = recording(&tab_a);
        let seen_b = recording(&tab_b);

        tab_a.set_item("k", "1").unwrap();

        assert!(seen_a.borrow().is_empty());
        let seen_b = seen_b.borrow();
        assert_eq!(seen_b.len(), 1);
        assert_eq!(seen_b[0].key.as_deref(), Some("k"));
        assert_eq!(seen_b[0].old_value, None);
        assert_eq!(seen_b[0].new_value.as_deref(), Some("1"));
    }

    #[test]
    fn remove_and_clear_notify_siblings() {
        let tab_a = MemoryStorage::new();
        let tab_b = tab_a.fork();
        tab_a.set_item("k", "1").unwrap();
        let seen_b = recording(&tab_b);

        tab_a.remove_item("k").unwrap();
        tab_a.remove_item("k").unwrap();
        tab_a.set_item("other", "2").unwrap();
        tab_a.clear().unwrap();

        let seen_b = seen_b.borrow();
        assert_eq!(seen_b.len(), 3);
        assert_eq!(seen_b[0].new_value, None);
        assert_eq!(seen_b[2].key, None);
        assert!(tab_b.is_empty());
    }

    #[test]
    fn quota_rejects_oversized_writes() {
        let store = MemoryStorage::with_quota(8);
        store.set_item("ab", "1234").unwrap();
        assert!(store.set_item("cd", "12345").is_err());
        // Overwriting a key only counts its new size
        store.set_item("ab", "123456").unwrap();
        assert_eq!(store.get_item("cd").unwrap(), None);
    }
}
