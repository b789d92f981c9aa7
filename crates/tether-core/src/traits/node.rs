//! Node and document traits
//!
//! A node is the observed element: it dispatches events, answers
//! containment queries, and exposes the few style and geometry facts
//! the scroll-lock binding needs.

use std::rc::Rc;

use super::event_target::{EventTarget, NodeId};

/// Trait for an element in the observed tree
pub trait Node: EventTarget {
    /// Stable identity of this node
    fn id(&self) -> NodeId;

    /// Whether `other` is this node or one of its descendants
    fn contains(&self, other: NodeId) -> bool;

    /// Inline style property, `None` when not set inline
    fn inline_style(&self, property: &str) -> Option<String>;

    /// Set (`Some`) or remove (`None`) an inline style property
    fn set_inline_style(&self, property: &str, value: Option<&str>);

    /// Resolved style value (inline if present, otherwise the cascade)
    fn computed_style(&self, property: &str) -> String;

    /// Rendered width including the vertical scrollbar
    fn offset_width(&self) -> f64;

    /// Inner width excluding the vertical scrollbar
    fn client_width(&self) -> f64;
}

/// Shared handle to a node
pub type NodeHandle = Rc<dyn Node>;

/// Trait for the document: the root event target and owner of `body`
pub trait Document: EventTarget {
    /// The document's root element
    fn body(&self) -> NodeHandle;
}
