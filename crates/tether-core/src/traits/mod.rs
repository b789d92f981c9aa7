//! Platform seams for tether
//!
//! This module defines the abstract interfaces bindings observe.
//!
//! - [`EventTarget`], [`Node`], [`Document`]: input events and the node tree
//! - [`StorageArea`]: key/value storage with cross-context notifications
//! - [`MediaMatcher`]: media query evaluation
//! - [`IntersectionObserverFactory`], [`ResizeObserverFactory`]: observers
//! - [`Clipboard`], [`HttpClient`]: async platform calls
//! - [`Scheduler`]: local tasks and timers

pub mod clipboard;
pub mod event_target;
pub mod http;
pub mod media_query;
pub mod node;
pub mod observer;
pub mod scheduler;
pub mod storage;

pub use clipboard::Clipboard;
pub use event_target::{Event, EventKind, EventTarget, Listener, ListenerId, NodeId};
pub use http::{FetchRequest, FetchResponse, HttpClient};
pub use media_query::{ChangeListener, MediaMatcher, MediaQueryList};
pub use node::{Document, Node, NodeHandle};
pub use observer::{
    IntersectionCallback, IntersectionEntry, IntersectionObserverFactory, IntersectionOptions,
    ObserverConnection, Rect, ResizeCallback, ResizeEntry, ResizeObserverFactory,
};
pub use scheduler::{LocalTask, Scheduler, TaskHandle};
pub use storage::{StorageArea, StorageEvent, StorageListener};
