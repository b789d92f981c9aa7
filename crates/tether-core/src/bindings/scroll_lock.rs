// # Scroll-Lock Binding
//
// Suppresses scrolling on a node without shifting its layout.
//
// ## Lock
//
// Snapshots the node's inline `overflow` and `padding-right`, sets
// `overflow: hidden`, and pads right by the current computed padding plus
// the scrollbar width (`offset_width - client_width`). Locking while
// locked does nothing, so the snapshot always holds pre-lock styles.
//
// ## Unlock
//
// Restores the snapshot verbatim: properties that were not set inline
// are removed again. Deactivation unlocks, so no lock outlives the
// binding.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::Result;
use crate::lifecycle::Lifecycle;
use crate::node_ref::NodeRef;
use crate::platform::Platform;
use crate::state::StateCell;
use crate::traits::{Document, NodeHandle};

struct Snapshot {
    node: NodeHandle,
    overflow: Option<String>,
    padding_right: Option<String>,
}

struct ScrollLockInner {
    target: NodeRef,
    snapshot: RefCell<Option<Snapshot>>,
    locked: StateCell<bool>,
}

impl ScrollLockInner {
    fn lock(&self) {
        if self.snapshot.borrow().is_some() {
            return;
        }
        let Some(node) = self.target.get() else {
            tracing::debug!("scroll lock has no target node");
            return;
        };

        let snapshot = Snapshot {
            overflow: node.inline_style("overflow"),
            padding_right: node.inline_style("padding-right"),
            node: node.clone(),
        };
        let scrollbar = (node.offset_width() - node.client_width()).max(0.0);
        let padding = parse_px(&node.computed_style("padding-right")) + scrollbar;

        node.set_inline_style("overflow", Some("hidden"));
        node.set_inline_style("padding-right", Some(&format!("{}px", padding)));
        *self.snapshot.borrow_mut() = Some(snapshot);
        self.locked.set_if_changed(true);
        tracing::debug!(node = %node.id(), scrollbar, "scroll locked");
    }

    fn unlock(&self) {
        let Some(snapshot) = self.snapshot.borrow_mut().take() else {
            return;
        };
        let node = &snapshot.node;
        node.set_inline_style("overflow", snapshot.overflow.as_deref());
        node.set_inline_style("padding-right", snapshot.padding_right.as_deref());
        self.locked.set_if_changed(false);
        tracing::debug!(node = %node.id(), "scroll unlocked");
    }
}

/// `"12.5px"` -> `12.5`; anything unparseable is `0`
fn parse_px(value: &str) -> f64 {
    value
        .trim()
        .trim_end_matches("px")
        .trim()
        .parse()
        .unwrap_or(0.0)
}

/// Scroll suppression for one node (the document body by default)
pub struct ScrollLock {
    document: Option<Rc<dyn Document>>,
    inner: Rc<ScrollLockInner>,
}

impl ScrollLock {
    /// Lock `target`, or the document body when the slot is empty at
    /// activation
    pub fn new(platform: &Platform, target: Option<NodeRef>) -> Self {
        Self {
            document: platform.document(),
            inner: Rc::new(ScrollLockInner {
                target: target.unwrap_or_default(),
                snapshot: RefCell::new(None),
                locked: StateCell::new(false),
            }),
        }
    }

    pub fn node_ref(&self) -> NodeRef {
        self.inner.target.clone()
    }

    pub fn is_locked(&self) -> bool {
        self.inner.locked.get()
    }

    pub fn lock(&self) {
        self.inner.lock();
    }

    pub fn unlock(&self) {
        self.inner.unlock();
    }

    /// Cloneable lock/unlock controls
    pub fn controls(&self) -> ScrollLockHandle {
        ScrollLockHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl Lifecycle for ScrollLock {
    fn activate(&mut self) -> Result<()> {
        if !self.inner.target.is_set() {
            if let Some(document) = &self.document {
                self.inner.target.set(Some(document.body()));
            }
        }
        Ok(())
    }

    fn deactivate(&mut self) {
        self.inner.unlock();
    }
}

/// Lock controls that become no-ops once the binding is gone
#[derive(Clone)]
pub struct ScrollLockHandle {
    inner: Weak<ScrollLockInner>,
}

impl ScrollLockHandle {
    pub fn lock(&self) {
        match self.inner.upgrade() {
            Some(inner) => inner.lock(),
            None => tracing::warn!("scroll lock used after the binding was disposed"),
        }
    }

    pub fn unlock(&self) {
        match self.inner.upgrade() {
            Some(inner) => inner.unlock(),
            None => tracing::warn!("scroll unlock used after the binding was disposed"),
        }
    }
}
