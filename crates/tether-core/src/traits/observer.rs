// # Observer Traits
//
// Intersection and resize observers: primitives that watch a node and
// deliver batches of entries to a callback until disconnected.
//
// ## Delivery
//
// A callback may receive entries for targets other than the one it
// asked for (observers are commonly shared). Consumers filter by
// `target`.

use serde::{Deserialize, Serialize};
use std::rc::Rc;

use super::event_target::NodeId;
use super::node::NodeHandle;
use crate::Result;

/// Axis-aligned rectangle in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Rectangle anchored at `(left, top)` with the given size
    pub fn from_size(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            bottom: top + height,
            right: left + width,
            width,
            height,
        }
    }
}

/// One intersection observation
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
    pub ratio: f64,
}

/// One resize observation
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeEntry {
    pub target: NodeId,
    pub content_rect: Rect,
}

/// Intersection observer options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IntersectionOptions {
    /// Ancestor used as the viewport, `None` for the document viewport
    #[serde(default)]
    pub root: Option<NodeId>,

    /// Margin around the root, CSS shorthand (e.g. `"10px 0px"`)
    #[serde(default)]
    pub root_margin: String,

    /// Visibility ratios at which the callback fires
    #[serde(default)]
    pub thresholds: Vec<f64>,
}

pub type IntersectionCallback = Rc<dyn Fn(&[IntersectionEntry])>;
pub type ResizeCallback = Rc<dyn Fn(&[ResizeEntry])>;

/// A live observation; `disconnect` stops delivery and is idempotent
pub trait ObserverConnection {
    fn disconnect(&mut self);
}

/// Trait for intersection observer construction
pub trait IntersectionObserverFactory {
    /// Start observing `target`
    ///
    /// # Errors
    ///
    /// Fails when the observer cannot be created (e.g. invalid threshold).
    fn observe(
        &self,
        target: &NodeHandle,
        options: &IntersectionOptions,
        callback: IntersectionCallback,
    ) -> Result<Box<dyn ObserverConnection>>;
}

/// Trait for resize observer construction
pub trait ResizeObserverFactory {
    /// Start observing `target`
    fn observe(
        &self,
        target: &NodeHandle,
        callback: ResizeCallback,
    ) -> Result<Box<dyn ObserverConnection>>;
}
