//! Lifecycle bindings
//!
//! One module per external resource. Every binding implements
//! [`Lifecycle`](crate::Lifecycle) and exposes its state through plain
//! getters plus a `version()` change counter.

pub mod click_outside;
pub mod clipboard;
pub mod debounce;
pub mod fetch;
pub mod first_render;
pub mod focus;
pub mod form;
pub mod hover;
pub mod idle;
pub mod intersection;
pub mod local_storage;
pub mod media_query;
pub mod previous;
pub mod resize;
pub mod scroll_lock;
mod toggle;

pub use click_outside::{ClickOutside, OutsideCallback};
pub use clipboard::{COPY_FAILED, ClipboardBinding, CopyHandle};
pub use debounce::Debounced;
pub use fetch::{Fetch, FetchState};
pub use first_render::FirstRender;
pub use focus::Focus;
pub use form::{FieldChange, Form, FormErrors, FormHandle, SubmitEvent};
pub use hover::Hover;
pub use idle::{Idle, IdleOptions};
pub use intersection::Intersection;
pub use local_storage::{LocalStorage, SetValue, Update};
pub use media_query::MediaQuery;
pub use previous::Previous;
pub use resize::Resize;
pub use scroll_lock::{ScrollLock, ScrollLockHandle};
