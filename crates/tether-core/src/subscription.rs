// # Subscription Guard
//
// Pairs every attach with exactly one detach.
//
// ## Guarantees
//
// - A `Subscription` runs its detach action at most once, whether it is
//   detached explicitly, dropped, or both.
// - A `SubscriptionGuard` holds at most one live subscription. Any
//   re-activation detaches the previous subscription before attaching
//   the next one.
// - A failing attach leaves the guard inactive. Anything the attach
//   managed to register before failing was wrapped in a `Subscription`
//   and is released when that value drops.
//
// ## Epochs
//
// Every activation and deactivation advances the guard's epoch. Async
// work started during an activation carries an `Epoch` token and must
// check `is_current()` before touching binding state, so completions
// from a superseded (or torn down) cycle are dropped.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::Result;
use crate::traits::{EventKind, EventTarget, Listener};

/// An attached resource and the action that releases it
pub struct Subscription {
    label: &'static str,
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap an already-performed attach with its detach action
    pub fn new(label: &'static str, detach: impl FnOnce() + 'static) -> Self {
        Self {
            label,
            detach: Some(Box::new(detach)),
        }
    }

    /// A subscription with nothing to release
    pub fn noop(label: &'static str) -> Self {
        Self {
            label,
            detach: None,
        }
    }

    /// Register `listener` on `target` for `kind`
    pub fn listen<T>(target: Rc<T>, kind: EventKind, listener: Listener) -> Self
    where
        T: EventTarget + ?Sized + 'static,
    {
        let id = target.add_listener(kind, listener);
        Self::new(kind.as_str(), move || {
            target.remove_listener(id);
        })
    }

    /// Register one listener for several kinds on `target`
    pub fn listen_all<T>(target: Rc<T>, kinds: &[EventKind], listener: Listener) -> Self
    where
        T: EventTarget + ?Sized + 'static,
    {
        let ids: Vec<_> = kinds
            .iter()
            .map(|kind| target.add_listener(*kind, listener.clone()))
            .collect();
        Self::new("listeners", move || {
            for id in ids {
                target.remove_listener(id);
            }
        })
    }

    /// Combine subscriptions; they detach in reverse order of `parts`
    pub fn merge(parts: Vec<Subscription>) -> Self {
        Self::new("merged", move || {
            for mut part in parts.into_iter().rev() {
                part.detach();
            }
        })
    }

    /// Run the detach action
    ///
    /// # Returns
    ///
    /// `true` only for the call that actually detached.
    pub fn detach(&mut self) -> bool {
        match self.detach.take() {
            Some(detach) => {
                tracing::trace!(label = self.label, "detaching subscription");
                detach();
                true
            }
            None => false,
        }
    }

    /// Whether the detach action has yet to run
    pub fn is_attached(&self) -> bool {
        self.detach.is_some()
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("label", &self.label)
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Token identifying one activation cycle of a guard
#[derive(Debug, Clone)]
pub struct Epoch {
    value: u64,
    shared: Weak<Cell<u64>>,
}

impl Epoch {
    /// Whether the cycle this token was issued for is still live
    ///
    /// Always `false` once the guard itself is gone.
    pub fn is_current(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|current| current.get() == self.value)
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

/// Holds at most one live subscription, keyed by resource identity
///
/// # Example
///
/// ```rust
/// use tether_core::subscription::{Subscription, SubscriptionGuard};
///
/// let mut guard = SubscriptionGuard::new("example");
/// guard.activate("a", |_, _| Ok(Subscription::noop("a"))).unwrap();
///
/// // Same key: nothing to do
/// assert!(!guard.sync("a", |_, _| Ok(Subscription::noop("a"))).unwrap());
/// // New key: "a" is detached first, then "b" attaches
/// assert!(guard.sync("b", |_, _| Ok(Subscription::noop("b"))).unwrap());
///
/// assert!(guard.deactivate());
/// assert!(!guard.deactivate());
/// ```
pub struct SubscriptionGuard<K> {
    name: &'static str,
    current: Option<(K, Subscription)>,
    epoch: Rc<Cell<u64>>,
}

impl<K: PartialEq> SubscriptionGuard<K> {
    /// Create an inactive guard; `name` labels its log lines
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            current: None,
            epoch: Rc::new(Cell::new(0)),
        }
    }

    /// Detach whatever is live, then attach for `key`
    ///
    /// # Errors
    ///
    /// Returns the attach error; the guard is then inactive.
    pub fn activate<F>(&mut self, key: K, attach: F) -> Result<()>
    where
        F: FnOnce(&K, Epoch) -> Result<Subscription>,
    {
        self.deactivate();
        let epoch = self.advance();

        match attach(&key, epoch) {
            Ok(subscription) => {
                tracing::debug!(guard = self.name, label = subscription.label(), "attached");
                self.current = Some((key, subscription));
                Ok(())
            }
            Err(e) => {
                self.advance();
                tracing::warn!(guard = self.name, error = %e, "attach failed; guard left inactive");
                Err(e)
            }
        }
    }

    /// Attach for `key` unless that exact key is already live
    ///
    /// # Returns
    ///
    /// `true` when a (re-)attach happened.
    pub fn sync<F>(&mut self, key: K, attach: F) -> Result<bool>
    where
        F: FnOnce(&K, Epoch) -> Result<Subscription>,
    {
        if self.key() == Some(&key) {
            return Ok(false);
        }
        self.activate(key, attach)?;
        Ok(true)
    }

    /// Detach the live subscription, if any
    ///
    /// # Returns
    ///
    /// `true` if something was detached; repeated calls return `false`.
    pub fn deactivate(&mut self) -> bool {
        match self.current.take() {
            Some((_, mut subscription)) => {
                self.advance();
                subscription.detach();
                tracing::debug!(guard = self.name, "detached");
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Identity of the live resource
    pub fn key(&self) -> Option<&K> {
        self.current.as_ref().map(|(key, _)| key)
    }

    /// Token for the present cycle
    pub fn epoch(&self) -> Epoch {
        Epoch {
            value: self.epoch.get(),
            shared: Rc::downgrade(&self.epoch),
        }
    }

    fn advance(&self) -> Epoch {
        self.epoch.set(self.epoch.get() + 1);
        self.epoch()
    }
}

impl<K> fmt::Debug for SubscriptionGuard<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionGuard")
            .field("name", &self.name)
            .field("active", &self.current.is_some())
            .field("epoch", &self.epoch.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::cell::RefCell;

    fn tracked(log: &Rc<RefCell<Vec<String>>>, name: &str) -> Subscription {
        log.borrow_mut().push(format!("attach {}", name));
        let log = log.clone();
        let name = name.to_string();
        Subscription::new("tracked", move || log.borrow_mut().push(format!("detach {}", name)))
    }

    #[test]
    fn detach_runs_once_across_explicit_and_drop() {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let mut subscription = Subscription::new("once", move || counter.set(counter.get() + 1));

        assert!(subscription.detach());
        assert!(!subscription.detach());
        drop(subscription);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn key_change_detaches_before_attaching() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut guard = SubscriptionGuard::new("test");

        guard.sync(1, |_, _| Ok(tracked(&log, "one"))).unwrap();
        guard.sync(1, |_, _| Ok(tracked(&log, "unused"))).unwrap();
        guard.sync(2, |_, _| Ok(tracked(&log, "two"))).unwrap();
        drop(guard);

        assert_eq!(
            *log.borrow(),
            vec!["attach one", "detach one", "attach two", "detach two"]
        );
    }

    #[test]
    fn failed_attach_leaves_guard_inactive_and_releases_partials() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut guard = SubscriptionGuard::new("test");
        guard.activate(1, |_, _| Ok(tracked(&log, "one"))).unwrap();

        let result = guard.activate(2, |_, _| {
            let _partial = tracked(&log, "partial");
            Err(Error::observer("refused"))
        });

        assert!(result.is_err());
        assert!(!guard.is_active());
        assert_eq!(guard.key(), None);
        assert_eq!(
            *log.borrow(),
            vec!["attach one", "detach one", "attach partial", "detach partial"]
        );
    }

    #[test]
    fn epoch_goes_stale_on_every_transition() {
        let mut guard: SubscriptionGuard<u8> = SubscriptionGuard::new("test");
        let mut issued = None;
        guard
            .activate(1, |_, epoch| {
                issued = Some(epoch);
                Ok(Subscription::noop("epoch"))
            })
            .unwrap();
        let first = issued.take().unwrap();
        assert!(first.is_current());

        guard.sync(1, |_, _| Ok(Subscription::noop("epoch"))).unwrap();
        assert!(first.is_current(), "same key keeps the cycle");

        guard.deactivate();
        assert!(!first.is_current());

        let live = guard.epoch();
        drop(guard);
        assert!(!live.is_current());
    }

    #[test]
    fn listen_all_removes_every_registration() {
        let dom = crate::platform::MemoryDom::new();
        let window = dom.window();
        let listener: Listener = Rc::new(|_: &crate::traits::Event| {});

        let mut subscription = Subscription::listen_all(
            window,
            &[EventKind::KeyDown, EventKind::Wheel, EventKind::MouseMove],
            listener,
        );
        assert_eq!(dom.window_listener_count(), 3);

        subscription.detach();
        assert_eq!(dom.window_listener_count(), 0);
    }
}
