// # Platform
//
// The bundle of platform seams a binding may draw on.
//
// ## Non-interactive Contexts
//
// Every seam is optional. A platform with no document, storage or
// clipboard models server-side or headless execution: bindings built
// on it return their documented fallback state and never fail
// construction.
//
// ## Implementations
//
// - `memory`: a complete in-process platform for tests and embeddings
// - `TokioScheduler`: the default scheduler

pub mod listeners;
pub mod memory;
pub mod tokio_scheduler;

pub use listeners::ListenerSet;
pub use memory::{
    MemoryClipboard, MemoryDom, MemoryHttpClient, MemoryIntersectionObserver,
    MemoryMediaMatcher, MemoryNode, MemoryPlatform, MemoryResizeObserver,
};
pub use tokio_scheduler::TokioScheduler;

use std::fmt;
use std::rc::Rc;

use crate::Result;
use crate::config::TetherConfig;
use crate::traits::{
    Clipboard, Document, EventTarget, HttpClient, IntersectionObserverFactory, MediaMatcher,
    ResizeObserverFactory, Scheduler, StorageArea,
};

/// Platform seams available to bindings
///
/// Cloning is cheap: every seam is reference counted.
///
/// # Example
///
/// ```rust
/// use tether_core::Platform;
///
/// let platform = Platform::headless();
/// assert!(platform.document().is_none());
/// assert!(platform.scheduler().is_some());
/// ```
#[derive(Clone, Default)]
pub struct Platform {
    window: Option<Rc<dyn EventTarget>>,
    document: Option<Rc<dyn Document>>,
    local_storage: Option<Rc<dyn StorageArea>>,
    media: Option<Rc<dyn MediaMatcher>>,
    intersection: Option<Rc<dyn IntersectionObserverFactory>>,
    resize: Option<Rc<dyn ResizeObserverFactory>>,
    clipboard: Option<Rc<dyn Clipboard>>,
    http: Option<Rc<dyn HttpClient>>,
    scheduler: Option<Rc<dyn Scheduler>>,
    config: TetherConfig,
}

impl Platform {
    /// A non-interactive platform with only the default scheduler
    pub fn headless() -> Self {
        Self::default().with_scheduler(Rc::new(TokioScheduler::new()))
    }

    /// A headless platform with the storage backend `config` names
    pub fn from_config(config: TetherConfig) -> Result<Self> {
        config.validate()?;
        let storage = crate::storage::open(&config.storage)?;
        let mut platform = Self::headless().with_config(config);
        platform.local_storage = storage;
        Ok(platform)
    }

    pub fn with_window(mut self, window: Rc<dyn EventTarget>) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_document(mut self, document: Rc<dyn Document>) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_local_storage(mut self, storage: Rc<dyn StorageArea>) -> Self {
        self.local_storage = Some(storage);
        self
    }

    pub fn with_media(mut self, media: Rc<dyn MediaMatcher>) -> Self {
        self.media = Some(media);
        self
    }

    pub fn with_intersection(mut self, factory: Rc<dyn IntersectionObserverFactory>) -> Self {
        self.intersection = Some(factory);
        self
    }

    pub fn with_resize(mut self, factory: Rc<dyn ResizeObserverFactory>) -> Self {
        self.resize = Some(factory);
        self
    }

    pub fn with_clipboard(mut self, clipboard: Rc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn with_http(mut self, http: Rc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_scheduler(mut self, scheduler: Rc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Remove the scheduler (timers become contained no-ops)
    pub fn without_scheduler(mut self) -> Self {
        self.scheduler = None;
        self
    }

    pub fn with_config(mut self, config: TetherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn window(&self) -> Option<Rc<dyn EventTarget>> {
        self.window.clone()
    }

    pub fn document(&self) -> Option<Rc<dyn Document>> {
        self.document.clone()
    }

    pub fn local_storage(&self) -> Option<Rc<dyn StorageArea>> {
        self.local_storage.clone()
    }

    pub fn media(&self) -> Option<Rc<dyn MediaMatcher>> {
        self.media.clone()
    }

    pub fn intersection(&self) -> Option<Rc<dyn IntersectionObserverFactory>> {
        self.intersection.clone()
    }

    pub fn resize(&self) -> Option<Rc<dyn ResizeObserverFactory>> {
        self.resize.clone()
    }

    pub fn clipboard(&self) -> Option<Rc<dyn Clipboard>> {
        self.clipboard.clone()
    }

    pub fn http(&self) -> Option<Rc<dyn HttpClient>> {
        self.http.clone()
    }

    pub fn scheduler(&self) -> Option<Rc<dyn Scheduler>> {
        self.scheduler.clone()
    }

    pub fn config(&self) -> &TetherConfig {
        &self.config
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("window", &self.window.is_some())
            .field("document", &self.document.is_some())
            .field("local_storage", &self.local_storage.is_some())
            .field("media", &self.media.is_some())
            .field("intersection", &self.intersection.is_some())
            .field("resize", &self.resize.is_some())
            .field("clipboard", &self.clipboard.is_some())
            .field("http", &self.http.is_some())
            .field("scheduler", &self.scheduler.is_some())
            .field("config", &self.config)
            .finish()
    }
}
