// # Element Toggle
//
// Shared machinery behind the focus and hover bindings: a boolean driven
// by an "on" and an "off" event on whichever node the ref callback last
// received.
//
// ## States
//
// - detached: inactive, or no node; flag is `false`
// - attached: `on`/`off` listeners live on exactly one node
//
// Swapping the node detaches the previous node's listeners before the
// new node's are attached, and resets the flag.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::Result;
use crate::node_ref::NodeCallback;
use crate::state::StateCell;
use crate::subscription::{Subscription, SubscriptionGuard};
use crate::traits::{Event, EventKind, Listener, NodeHandle, NodeId};

struct ToggleInner {
    on: EventKind,
    off: EventKind,
    node: RefCell<Option<NodeHandle>>,
    state: StateCell<bool>,
    guard: RefCell<SubscriptionGuard<NodeId>>,
    active: Cell<bool>,
}

impl ToggleInner {
    fn sync(self: &Rc<Self>) -> Result<()> {
        let node = self.node.borrow().clone();
        let mut guard = self.guard.borrow_mut();
        let Some(node) = node else {
            if guard.deactivate() {
                self.state.set_if_changed(false);
            }
            return Ok(());
        };

        let weak = Rc::downgrade(self);
        let changed = guard.sync(node.id(), move |_, _| {
            let on = Subscription::listen(node.clone(), self.on, flag(&weak, true));
            let off = Subscription::listen(node, self.off, flag(&weak, false));
            Ok(Subscription::merge(vec![on, off]))
        })?;
        if changed {
            self.state.set_if_changed(false);
        }
        Ok(())
    }
}

fn flag(inner: &Weak<ToggleInner>, value: bool) -> Listener {
    let inner = inner.clone();
    Rc::new(move |_: &Event| {
        if let Some(inner) = inner.upgrade() {
            inner.state.set_if_changed(value);
        }
    })
}

/// Boolean toggled by a pair of node events
pub(crate) struct ElementToggle {
    name: &'static str,
    inner: Rc<ToggleInner>,
}

impl ElementToggle {
    pub(crate) fn new(name: &'static str, on: EventKind, off: EventKind) -> Self {
        Self {
            name,
            inner: Rc::new(ToggleInner {
                on,
                off,
                node: RefCell::new(None),
                state: StateCell::new(false),
                guard: RefCell::new(SubscriptionGuard::new(name)),
                active: Cell::new(false),
            }),
        }
    }

    pub(crate) fn ref_callback(&self) -> NodeCallback {
        let inner = Rc::downgrade(&self.inner);
        let name = self.name;
        NodeCallback::new(move |node| {
            let Some(inner) = inner.upgrade() else {
                tracing::warn!(binding = name, "node reference set on a disposed binding");
                return;
            };
            *inner.node.borrow_mut() = node;
            if inner.active.get() {
                if let Err(e) = inner.sync() {
                    tracing::warn!(binding = name, error = %e, "failed to attach to new node");
                }
            }
        })
    }

    pub(crate) fn get(&self) -> bool {
        self.inner.state.get()
    }

    pub(crate) fn version(&self) -> u64 {
        self.inner.state.version()
    }

    pub(crate) fn node(&self) -> Option<NodeHandle> {
        self.inner.node.borrow().clone()
    }

    pub(crate) fn activate(&mut self) -> Result<()> {
        self.inner.active.set(true);
        self.inner.sync()
    }

    pub(crate) fn deactivate(&mut self) {
        self.inner.active.set(false);
        self.inner.guard.borrow_mut().deactivate();
        self.inner.state.set_if_changed(false);
    }
}
