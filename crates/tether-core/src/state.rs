//! Exposed binding state
//!
//! A [`StateCell`] is the only place a binding's exposed value lives.
//! It is written from the binding's own callbacks and read by the
//! composition layer, which can await [`StateCell::changes`] to learn
//! when a re-read is due. The cell never schedules anything itself.

use std::cell::{Cell, RefCell};
use std::fmt;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Observable value with a change counter
pub struct StateCell<T> {
    value: RefCell<T>,
    version: Cell<u64>,
    notify: watch::Sender<u64>,
}

impl<T: Clone> StateCell<T> {
    /// Create a cell; `initial` is readable immediately
    pub fn new(initial: T) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            value: RefCell::new(initial),
            version: Cell::new(0),
            notify,
        }
    }

    /// Snapshot of the current value
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Borrow the current value without cloning
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.value.borrow())
    }

    /// Replace the value and bump the version
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
        self.bump();
    }

    /// Mutate the value in place and bump the version
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut *self.value.borrow_mut());
        self.bump();
    }

    /// Number of writes so far
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// Stream of versions, yielding after each future write
    pub fn changes(&self) -> WatchStream<u64> {
        WatchStream::from_changes(self.notify.subscribe())
    }

    fn bump(&self) {
        let version = self.version.get() + 1;
        self.version.set(version);
        self.notify.send_replace(version);
    }
}

impl<T: Clone + PartialEq> StateCell<T> {
    /// Write only when `value` differs from the current value
    ///
    /// # Returns
    ///
    /// `true` if the value changed.
    pub fn set_if_changed(&self, value: T) -> bool {
        if *self.value.borrow() == value {
            return false;
        }
        self.set(value);
        true
    }
}

impl<T: fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("value", &self.value.borrow())
            .field("version", &self.version.get())
            .finish()
    }
}
