//! Hover tracking
//!
//! `true` between a `mouseenter` and the next `mouseleave` on the
//! referenced node. No debouncing.

use crate::Result;
use crate::bindings::toggle::ElementToggle;
use crate::lifecycle::Lifecycle;
use crate::node_ref::NodeCallback;
use crate::traits::{EventKind, NodeHandle};

/// Hover state of one node
pub struct Hover {
    toggle: ElementToggle,
}

impl Hover {
    pub fn new() -> Self {
        Self {
            toggle: ElementToggle::new("hover", EventKind::MouseEnter, EventKind::MouseLeave),
        }
    }

    pub fn ref_callback(&self) -> NodeCallback {
        self.toggle.ref_callback()
    }

    pub fn is_hovered(&self) -> bool {
        self.toggle.get()
    }

    pub fn version(&self) -> u64 {
        self.toggle.version()
    }

    pub fn node(&self) -> Option<NodeHandle> {
        self.toggle.node()
    }
}

impl Default for Hover {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle for Hover {
    fn activate(&mut self) -> Result<()> {
        self.toggle.activate()
    }

    fn deactivate(&mut self) {
        self.toggle.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mount;
    use crate::platform::MemoryDom;
    use crate::traits::Node;

    #[test]
    fn enter_and_leave_flip_the_flag() {
        let dom = MemoryDom::new();
        let card = dom.create_element(None);
        let hover = Hover::new();
        let callback = hover.ref_callback();
        callback.call(Some(card.handle()));
        let mut mounted = Mount::new(hover).unwrap();

        dom.dispatch(EventKind::MouseEnter, Some(card.id()));
        assert!(mounted.is_hovered());
        dom.dispatch(EventKind::MouseLeave, Some(card.id()));
        assert!(!mounted.is_hovered());

        mounted.unmount();
        assert_eq!(card.listener_count(), 0);
        mounted.remount().unwrap();
        assert_eq!(card.listener_count(), 2);
    }
}
