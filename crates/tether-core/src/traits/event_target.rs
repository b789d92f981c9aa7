// # Event Target Trait
//
// Defines the interface for anything that dispatches input events:
// the window, the document, and individual nodes.
//
// ## Purpose
//
// Bindings never reach into a concrete DOM. They register listeners
// through this trait and remove them by the returned id, which is the
// only thing a Subscription needs to remember for teardown.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Identity of a node in the observed tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Input event types bindings listen for
///
/// Serialized with their DOM event names (`mousedown`, `touchstart`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    MouseDown,
    MouseMove,
    TouchStart,
    TouchMove,
    KeyDown,
    Wheel,
    MouseEnter,
    MouseLeave,
    Focus,
    Blur,
}

impl EventKind {
    /// DOM event name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::MouseDown => "mousedown",
            EventKind::MouseMove => "mousemove",
            EventKind::TouchStart => "touchstart",
            EventKind::TouchMove => "touchmove",
            EventKind::KeyDown => "keydown",
            EventKind::Wheel => "wheel",
            EventKind::MouseEnter => "mouseenter",
            EventKind::MouseLeave => "mouseleave",
            EventKind::Focus => "focus",
            EventKind::Blur => "blur",
        }
    }

    /// Whether the event propagates from its target up to the window
    pub fn bubbles(&self) -> bool {
        !matches!(
            self,
            EventKind::MouseEnter | EventKind::MouseLeave | EventKind::Focus | EventKind::Blur
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dispatched input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event type
    pub kind: EventKind,
    /// Node the event originated at, `None` for the document itself
    pub target: Option<NodeId>,
}

impl Event {
    /// Create an event
    pub fn new(kind: EventKind, target: Option<NodeId>) -> Self {
        Self { kind, target }
    }
}

/// Handle used to remove a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Event listener callback
pub type Listener = Rc<dyn Fn(&Event)>;

/// Trait for event dispatching targets
///
/// # Single-threaded
///
/// Targets live on the UI thread. Implementations must tolerate a
/// listener removing itself (or another listener) while an event is
/// being dispatched.
pub trait EventTarget {
    /// Register a listener for one event kind
    ///
    /// # Returns
    ///
    /// An id that removes exactly this registration.
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerId;

    /// Remove a listener
    ///
    /// # Returns
    ///
    /// - `true` if the listener was registered and is now removed
    /// - `false` if the id was unknown (already removed); never an error
    fn remove_listener(&self, id: ListenerId) -> bool;
}
