// # Click-Outside Binding
//
// Fires a callback for every pointer press that lands outside a node.
//
// ## States
//
// - unarmed: no document listener
// - armed: one `mousedown` listener on the document
//
// The listener reads the node slot at event time, so setting the slot
// never requires re-arming. Changing the callback or the slot itself
// replaces the listener. A press on the node or any descendant never
// fires; a press with no target counts as outside. An empty slot never
// fires.

use std::rc::Rc;

use crate::Result;
use crate::lifecycle::Lifecycle;
use crate::node_ref::{NodeRef, RefComposer};
use crate::platform::Platform;
use crate::subscription::{Subscription, SubscriptionGuard};
use crate::traits::{Document, Event, EventKind, Listener};

/// Callback invoked with the outside press
pub type OutsideCallback = Rc<dyn Fn(&Event)>;

/// Click-outside detection for one node
pub struct ClickOutside {
    document: Option<Rc<dyn Document>>,
    refs: RefComposer,
    callback: OutsideCallback,
    revision: u64,
    guard: SubscriptionGuard<(u64, usize)>,
}

impl ClickOutside {
    /// Create an unarmed binding
    ///
    /// # Parameters
    ///
    /// - `callback`: called once per outside press
    /// - `external`: a slot shared with other bindings; `None` for an
    ///   internally owned one
    pub fn new(
        platform: &Platform,
        callback: impl Fn(&Event) + 'static,
        external: Option<NodeRef>,
    ) -> Self {
        Self {
            document: platform.document(),
            refs: RefComposer::new(external),
            callback: Rc::new(callback),
            revision: 0,
            guard: SubscriptionGuard::new("click-outside"),
        }
    }

    /// The slot to point at the guarded node
    pub fn node_ref(&self) -> NodeRef {
        self.refs.slot()
    }

    /// Replace the callback; an armed binding swaps its listener
    pub fn set_callback(&mut self, callback: impl Fn(&Event) + 'static) -> Result<()> {
        self.callback = Rc::new(callback);
        self.revision += 1;
        self.rearm()
    }

    /// Replace the caller-supplied slot
    pub fn set_external_ref(&mut self, external: Option<NodeRef>) -> Result<()> {
        self.refs.set_external(external);
        self.rearm()
    }

    pub fn is_armed(&self) -> bool {
        self.guard.is_active()
    }

    fn rearm(&mut self) -> Result<()> {
        if self.guard.is_active() {
            self.arm()
        } else {
            Ok(())
        }
    }

    fn arm(&mut self) -> Result<()> {
        let Some(document) = self.document.clone() else {
            tracing::debug!("no document; click-outside stays unarmed");
            return Ok(());
        };
        let slot = self.refs.slot();
        let callback = self.callback.clone();

        self.guard
            .sync((self.revision, slot.slot_id()), move |_, _| {
                let listener: Listener = Rc::new(move |event: &Event| {
                    let Some(node) = slot.get() else { return };
                    let inside = event.target.is_some_and(|target| node.contains(target));
                    if !inside {
                        callback(event);
                    }
                });
                Ok(Subscription::listen(document, EventKind::MouseDown, listener))
            })?;
        Ok(())
    }
}

impl Lifecycle for ClickOutside {
    fn activate(&mut self) -> Result<()> {
        self.arm()
    }

    fn deactivate(&mut self) {
        self.guard.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mount;
    use crate::platform::MemoryPlatform;
    use std::cell::Cell;

    #[test]
    fn replacing_the_callback_swaps_the_listener() {
        let memory = MemoryPlatform::new();
        let node = memory.dom.create_element(None);
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));

        let counter = first.clone();
        let binding =
            ClickOutside::new(&memory.platform(), move |_| counter.set(counter.get() + 1), None);
        binding.node_ref().set(Some(node.handle()));
        let mut mounted = Mount::new(binding).unwrap();

        let counter = second.clone();
        mounted.set_callback(move |_| counter.set(counter.get() + 1)).unwrap();
        assert_eq!(memory.dom.document_listener_count(), 1);

        memory.dom.dispatch(EventKind::MouseDown, None);
        assert_eq!((first.get(), second.get()), (0, 1));

        drop(mounted);
        assert_eq!(memory.dom.listener_count(), 0);
    }

    #[test]
    fn without_a_document_the_binding_stays_unarmed() {
        let mounted = Mount::new(ClickOutside::new(&Platform::headless(), |_| {}, None)).unwrap();
        assert!(!mounted.is_armed());
    }
}
