//! Listener registry shared by the in-memory platform and storage areas

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::traits::ListenerId;

/// An ordered set of listeners for one event type
///
/// Dispatch works on a snapshot, so listeners may add or remove
/// registrations (including their own) while an event is delivered.
/// A listener removed mid-dispatch is not called for that event.
pub struct ListenerSet<E: ?Sized> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(ListenerId, Rc<dyn Fn(&E)>)>>,
}

impl<E: ?Sized> ListenerSet<E> {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Register a listener
    pub fn add(&self, listener: Rc<dyn Fn(&E)>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    /// Remove a listener; unknown ids return `false`
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    /// Whether `id` is still registered
    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.borrow().iter().any(|(entry, _)| *entry == id)
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Deliver `event` to every listener registered when dispatch began
    pub fn dispatch(&self, event: &E) {
        let snapshot: Vec<_> = self.entries.borrow().clone();
        for (id, listener) in snapshot {
            if self.contains(id) {
                listener(event);
            }
        }
    }
}

impl<E: ?Sized> Default for ListenerSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> fmt::Debug for ListenerSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_removed_during_dispatch_is_skipped() {
        let set: Rc<ListenerSet<u32>> = Rc::new(ListenerSet::new());
        let calls = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(None));

        let (set_ref, second_ref) = (set.clone(), second.clone());
        set.add(Rc::new(move |_: &u32| {
            if let Some(id) = second_ref.get() {
                set_ref.remove(id);
            }
        }));
        let counter = calls.clone();
        second.set(Some(set.add(Rc::new(move |_: &u32| {
            counter.set(counter.get() + 1)
        }))));

        set.dispatch(&7);
        assert_eq!(calls.get(), 0);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let set: ListenerSet<u32> = ListenerSet::new();
        let id = set.add(Rc::new(|_: &u32| {}));
        assert!(set.remove(id));
        assert!(!set.remove(id));
        assert!(set.is_empty());
    }
}
