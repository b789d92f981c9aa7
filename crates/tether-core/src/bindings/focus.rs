//! Focus tracking
//!
//! `true` between a `focus` and the next `blur` on the referenced node.

use crate::Result;
use crate::bindings::toggle::ElementToggle;
use crate::lifecycle::Lifecycle;
use crate::node_ref::NodeCallback;
use crate::traits::{EventKind, NodeHandle};

/// Focus state of one node
pub struct Focus {
    toggle: ElementToggle,
}

impl Focus {
    pub fn new() -> Self {
        Self {
            toggle: ElementToggle::new("focus", EventKind::Focus, EventKind::Blur),
        }
    }

    /// Callback to hand to the element as its ref
    pub fn ref_callback(&self) -> NodeCallback {
        self.toggle.ref_callback()
    }

    pub fn is_focused(&self) -> bool {
        self.toggle.get()
    }

    pub fn version(&self) -> u64 {
        self.toggle.version()
    }

    /// The node last passed to the ref callback
    pub fn node(&self) -> Option<NodeHandle> {
        self.toggle.node()
    }
}

impl Default for Focus {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle for Focus {
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
    fn focus_and_blur_flip_the_flag() {
        let dom = MemoryDom::new();
        let input = dom.create_element(None);
        let focus = Focus::new();
        focus.ref_callback().call(Some(input.handle()));
        let mounted = Mount::new(focus).unwrap();

        dom.dispatch(EventKind::Focus, Some(input.id()));
        assert!(mounted.is_focused());
        dom.dispatch(EventKind::Blur, Some(input.id()));
        assert!(!mounted.is_focused());
    }

    #[test]
    fn focus_on_a_child_does_not_count() {
        let dom = MemoryDom::new();
        let parent = dom.create_element(None);
        let child = dom.create_element(Some(parent.id()));
        let focus = Focus::new();
        focus.ref_callback().call(Some(parent.handle()));
        let mounted = Mount::new(focus).unwrap();

        dom.dispatch(EventKind::Focus, Some(child.id()));
        assert!(!mounted.is_focused());
    }
}
