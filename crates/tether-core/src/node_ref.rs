//! Node references
//!
//! A [`NodeRef`] is a settable slot several bindings can share. The
//! [`RefComposer`] decides whether a binding writes into a slot the
//! caller supplied or into one it owns, so two bindings pointed at the
//! same slot observe the same node.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::traits::{NodeHandle, NodeId};

/// Shared, settable reference to a node
#[derive(Clone, Default)]
pub struct NodeRef {
    slot: Rc<RefCell<Option<NodeHandle>>>,
}

impl NodeRef {
    /// An empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot already pointing at `node`
    pub fn with_node(node: NodeHandle) -> Self {
        let node_ref = Self::new();
        node_ref.set(Some(node));
        node_ref
    }

    pub fn get(&self) -> Option<NodeHandle> {
        self.slot.borrow().clone()
    }

    pub fn set(&self, node: Option<NodeHandle>) {
        *self.slot.borrow_mut() = node;
    }

    pub fn clear(&self) {
        self.set(None);
    }

    pub fn is_set(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Identity of the referenced node
    pub fn node_id(&self) -> Option<NodeId> {
        self.slot.borrow().as_ref().map(|node| node.id())
    }

    /// Identity of the slot itself (shared by clones)
    pub fn slot_id(&self) -> usize {
        Rc::as_ptr(&self.slot) as usize
    }

    /// Whether `other` is a clone of this slot
    pub fn same_slot(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("node", &self.node_id())
            .finish()
    }
}

/// Picks the slot a binding writes to
#[derive(Debug, Clone, Default)]
pub struct RefComposer {
    internal: NodeRef,
    external: Option<NodeRef>,
}

impl RefComposer {
    /// Use `external` when supplied, otherwise an internally owned slot
    pub fn new(external: Option<NodeRef>) -> Self {
        Self {
            internal: NodeRef::new(),
            external,
        }
    }

    /// The slot in effect
    pub fn slot(&self) -> NodeRef {
        match &self.external {
            Some(external) => external.clone(),
            None => self.internal.clone(),
        }
    }

    pub fn is_external(&self) -> bool {
        self.external.is_some()
    }

    /// Replace (or drop) the caller-supplied slot
    pub fn set_external(&mut self, external: Option<NodeRef>) {
        self.external = external;
    }
}

/// Callback-style node reference
///
/// The composition layer calls it with the new node whenever the
/// rendered element changes, and with `None` when it goes away.
#[derive(Clone)]
pub struct NodeCallback {
    callback: Rc<dyn Fn(Option<NodeHandle>)>,
}

impl NodeCallback {
    pub fn new(callback: impl Fn(Option<NodeHandle>) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    pub fn call(&self, node: Option<NodeHandle>) {
        (self.callback)(node)
    }
}

impl fmt::Debug for NodeCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NodeCallback")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryDom;

    #[test]
    fn composer_prefers_external_slot() {
        let dom = MemoryDom::new();
        let shared = NodeRef::new();
        let composer = RefComposer::new(Some(shared.clone()));

        composer.slot().set(Some(dom.body().handle()));
        assert!(composer.is_external());
        assert!(composer.slot().same_slot(&shared));
        assert_eq!(shared.node_id(), Some(dom.body().handle().id()));
    }

    #[test]
    fn internal_slot_is_stable_per_composer() {
        let first = RefComposer::new(None);
        let second = RefComposer::new(None);
        assert_eq!(first.slot().slot_id(), first.slot().slot_id());
        assert_ne!(first.slot().slot_id(), second.slot().slot_id());
    }
}
