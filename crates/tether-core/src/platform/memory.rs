// # Memory Platform
//
// In-process implementations of every platform seam.
//
// ## Purpose
//
// Lets bindings run without a browser: tests, headless embeddings and
// demos drive a small node tree, media queries, observers, a clipboard
// and an HTTP route table by hand, and inspect how many listeners and
// observations are live at any moment.
//
// ## Event Propagation
//
// `MemoryDom::dispatch` delivers an event to its target, then (for
// bubbling kinds) to every ancestor, the document and the window.
// Non-bubbling kinds (`mouseenter`, `mouseleave`, `focus`, `blur`) reach
// the target only. An event with no target starts at the document.

use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};

use super::Platform;
use super::listeners::ListenerSet;
use crate::config::TetherConfig;
use crate::error::FetchError;
use crate::storage::MemoryStorage;
use crate::traits::{
    ChangeListener, Clipboard, Document, Event, EventKind, EventTarget, FetchRequest,
    FetchResponse, HttpClient, IntersectionCallback, IntersectionEntry,
    IntersectionObserverFactory, IntersectionOptions, Listener, ListenerId, MediaMatcher,
    MediaQueryList, Node, NodeHandle, NodeId, ObserverConnection, ResizeCallback, ResizeEntry,
    ResizeObserverFactory,
};
use crate::{Error, Result};

fn add_for_kind(set: &ListenerSet<Event>, kind: EventKind, listener: Listener) -> ListenerId {
    set.add(Rc::new(move |event: &Event| {
        if event.kind == kind {
            listener(event)
        }
    }))
}

struct NodeData {
    parent: Option<NodeId>,
    inline: BTreeMap<String, String>,
    computed: BTreeMap<String, String>,
    offset_width: f64,
    client_width: f64,
    listeners: Rc<ListenerSet<Event>>,
}

struct DomInner {
    nodes: RefCell<BTreeMap<NodeId, NodeData>>,
    next_id: Cell<u64>,
    body: NodeId,
    document: ListenerSet<Event>,
    window: ListenerSet<Event>,
}

impl DomInner {
    fn insert(&self, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.nodes.borrow_mut().insert(
            id,
            NodeData {
                parent,
                inline: BTreeMap::new(),
                computed: BTreeMap::new(),
                offset_width: 0.0,
                client_width: 0.0,
                listeners: Rc::new(ListenerSet::new()),
            },
        );
        id
    }

    /// Listener sets an event visits, target first
    fn propagation_path(&self, target: NodeId, bubbles: bool) -> Vec<Rc<ListenerSet<Event>>> {
        let nodes = self.nodes.borrow();
        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(id) = cursor {
            let Some(data) = nodes.get(&id) else { break };
            path.push(data.listeners.clone());
            if !bubbles {
                break;
            }
            cursor = data.parent;
        }
        path
    }
}

/// An in-memory node tree with a document and a window
///
/// # Example
///
/// ```rust
/// use tether_core::platform::MemoryDom;
/// use tether_core::traits::{EventKind, Node};
///
/// let dom = MemoryDom::new();
/// let menu = dom.create_element(None);
/// let item = dom.create_element(Some(menu.id()));
///
/// assert!(menu.contains(item.id()));
/// dom.dispatch(EventKind::MouseDown, Some(item.id()));
/// ```
#[derive(Clone)]
pub struct MemoryDom {
    inner: Rc<DomInner>,
}

impl MemoryDom {
    /// Create a tree holding only `body`
    pub fn new() -> Self {
        let inner = DomInner {
            nodes: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(1),
            body: NodeId(0),
            document: ListenerSet::new(),
            window: ListenerSet::new(),
        };
        let body = inner.insert(None);
        Self {
            inner: Rc::new(DomInner { body, ..inner }),
        }
    }

    /// Create an element under `parent`, or under `body` when `None`
    pub fn create_element(&self, parent: Option<NodeId>) -> Rc<MemoryNode> {
        let id = self.inner.insert(Some(parent.unwrap_or(self.inner.body)));
        self.handle(id)
    }

    /// Create an element outside the document tree
    pub fn create_detached(&self) -> Rc<MemoryNode> {
        let id = self.inner.insert(None);
        self.handle(id)
    }

    /// Look up a node by id
    pub fn node(&self, id: NodeId) -> Option<Rc<MemoryNode>> {
        self.inner
            .nodes
            .borrow()
            .contains_key(&id)
            .then(|| self.handle(id))
    }

    /// The `body` element
    pub fn body(&self) -> Rc<MemoryNode> {
        self.handle(self.inner.body)
    }

    pub fn document(&self) -> Rc<dyn Document> {
        Rc::new(MemoryDocument {
            dom: self.inner.clone(),
        })
    }

    pub fn window(&self) -> Rc<dyn EventTarget> {
        Rc::new(MemoryWindow {
            dom: self.inner.clone(),
        })
    }

    /// Dispatch an input event
    pub fn dispatch(&self, kind: EventKind, target: Option<NodeId>) {
        let event = Event::new(kind, target);
        tracing::trace!(kind = %kind, ?target, "memory dom dispatch");

        if let Some(target) = target {
            for listeners in self.inner.propagation_path(target, kind.bubbles()) {
                listeners.dispatch(&event);
            }
            if !kind.bubbles() {
                return;
            }
        }
        self.inner.document.dispatch(&event);
        self.inner.window.dispatch(&event);
    }

    /// Live listeners across every node, the document and the window
    pub fn listener_count(&self) -> usize {
        let nodes: usize = self
            .inner
            .nodes
            .borrow()
            .values()
            .map(|data| data.listeners.len())
            .sum();
        nodes + self.inner.document.len() + self.inner.window.len()
    }

    pub fn document_listener_count(&self) -> usize {
        self.inner.document.len()
    }

    pub fn window_listener_count(&self) -> usize {
        self.inner.window.len()
    }

    fn handle(&self, id: NodeId) -> Rc<MemoryNode> {
        let listeners = self
            .inner
            .nodes
            .borrow()
            .get(&id)
            .map(|data| data.listeners.clone())
            .unwrap_or_default();
        Rc::new(MemoryNode {
            id,
            dom: self.inner.clone(),
            listeners,
        })
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a node of a [`MemoryDom`]
pub struct MemoryNode {
    id: NodeId,
    dom: Rc<DomInner>,
    listeners: Rc<ListenerSet<Event>>,
}

impl MemoryNode {
    /// Set a cascade (non-inline) style value
    pub fn set_computed_style(&self, property: &str, value: &str) {
        self.with_data(|data| {
            data.computed.insert(property.to_string(), value.to_string());
        });
    }

    /// Set the rendered widths; their difference is the scrollbar width
    pub fn set_widths(&self, offset_width: f64, client_width: f64) {
        self.with_data(|data| {
            data.offset_width = offset_width;
            data.client_width = client_width;
        });
    }

    /// Listeners registered directly on this node
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// This node as a trait object
    pub fn handle(self: &Rc<Self>) -> NodeHandle {
        self.clone()
    }

    fn with_data<R>(&self, f: impl FnOnce(&mut NodeData) -> R) -> Option<R> {
        self.dom.nodes.borrow_mut().get_mut(&self.id).map(f)
    }
}

impl EventTarget for MemoryNode {
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerId {
        add_for_kind(&self.listeners, kind, listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

impl Node for MemoryNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn contains(&self, other: NodeId) -> bool {
        let nodes = self.dom.nodes.borrow();
        let mut cursor = Some(other);
        while let Some(id) = cursor {
            if id == self.id {
                return true;
            }
            cursor = nodes.get(&id).and_then(|data| data.parent);
        }
        false
    }

    fn inline_style(&self, property: &str) -> Option<String> {
        self.with_data(|data| data.inline.get(property).cloned())
            .flatten()
    }

    fn set_inline_style(&self, property: &str, value: Option<&str>) {
        self.with_data(|data| match value {
            Some(value) => {
                data.inline.insert(property.to_string(), value.to_string());
            }
            None => {
                data.inline.remove(property);
            }
        });
    }

    fn computed_style(&self, property: &str) -> String {
        let resolved = self.with_data(|data| {
            data.inline
                .get(property)
                .or_else(|| data.computed.get(property))
                .cloned()
        });
        match resolved.flatten() {
            Some(value) => value,
            None => match property {
                "overflow" => "visible".to_string(),
                "padding-right" => "0px".to_string(),
                _ => String::new(),
            },
        }
    }

    fn offset_width(&self) -> f64 {
        self.with_data(|data| data.offset_width).unwrap_or(0.0)
    }

    fn client_width(&self) -> f64 {
        self.with_data(|data| data.client_width).unwrap_or(0.0)
    }
}

struct MemoryDocument {
    dom: Rc<DomInner>,
}

impl EventTarget for MemoryDocument {
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerId {
        add_for_kind(&self.dom.document, kind, listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.dom.document.remove(id)
    }
}

impl Document for MemoryDocument {
    fn body(&self) -> NodeHandle {
        let body = self.dom.body;
        let listeners = self
            .dom
            .nodes
            .borrow()
            .get(&body)
            .map(|data| data.listeners.clone())
            .unwrap_or_default();
        Rc::new(MemoryNode {
            id: body,
            dom: self.dom.clone(),
            listeners,
        })
    }
}

struct MemoryWindow {
    dom: Rc<DomInner>,
}

impl EventTarget for MemoryWindow {
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerId {
        add_for_kind(&self.dom.window, kind, listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.dom.window.remove(id)
    }
}

/// A media query list whose match state is set by hand
pub struct MemoryMediaQueryList {
    media: String,
    matches: Cell<bool>,
    listeners: ListenerSet<bool>,
}

impl MediaQueryList for MemoryMediaQueryList {
    fn media(&self) -> String {
        self.media.clone()
    }

    fn matches(&self) -> bool {
        self.matches.get()
    }

    fn add_change_listener(&self, listener: ChangeListener) -> ListenerId {
        self.listeners
            .add(Rc::new(move |matches: &bool| listener(*matches)))
    }

    fn remove_change_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

/// Media matcher over hand-set query states
///
/// Unknown queries evaluate to `false` until set.
#[derive(Default)]
pub struct MemoryMediaMatcher {
    lists: RefCell<BTreeMap<String, Rc<MemoryMediaQueryList>>>,
}

impl MemoryMediaMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether `query` matches, notifying listeners on a change
    pub fn set_matches(&self, query: &str, matches: bool) {
        let list = self.list(query);
        if list.matches.replace(matches) != matches {
            list.listeners.dispatch(&matches);
        }
    }

    /// Change listeners registered for `query`
    pub fn listener_count(&self, query: &str) -> usize {
        self.lists
            .borrow()
            .get(query)
            .map(|list| list.listeners.len())
            .unwrap_or(0)
    }

    /// Change listeners across every query
    pub fn total_listener_count(&self) -> usize {
        self.lists
            .borrow()
            .values()
            .map(|list| list.listeners.len())
            .sum()
    }

    fn list(&self, query: &str) -> Rc<MemoryMediaQueryList> {
        self.lists
            .borrow_mut()
            .entry(query.to_string())
            .or_insert_with(|| {
                Rc::new(MemoryMediaQueryList {
                    media: query.to_string(),
                    matches: Cell::new(false),
                    listeners: ListenerSet::new(),
                })
            })
            .clone()
    }
}

impl MediaMatcher for MemoryMediaMatcher {
    fn match_media(&self, query: &str) -> Option<Rc<dyn MediaQueryList>> {
        let list: Rc<dyn MediaQueryList> = self.list(query);
        Some(list)
    }
}

struct Observation<E> {
    id: u64,
    target: NodeId,
    callback: Rc<dyn Fn(&[E])>,
}

/// Live observations of one observer kind
struct ObservationRegistry<E> {
    next_id: Cell<u64>,
    observations: RefCell<Vec<Observation<E>>>,
    refuse_next: Cell<bool>,
}

impl<E: 'static> ObservationRegistry<E> {
    fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            observations: RefCell::new(Vec::new()),
            refuse_next: Cell::new(false),
        }
    }

    fn observe(
        self: &Rc<Self>,
        target: NodeId,
        callback: Rc<dyn Fn(&[E])>,
    ) -> Result<Box<dyn ObserverConnection>> {
        if self.refuse_next.replace(false) {
            return Err(Error::observer(format!("observer refused to watch {}", target)));
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.observations.borrow_mut().push(Observation {
            id,
            target,
            callback,
        });
        Ok(Box::new(RegistryConnection {
            id,
            registry: Rc::downgrade(self),
        }))
    }

    /// Deliver `entries` to every live observation
    fn trigger(&self, entries: &[E]) {
        let callbacks: Vec<_> = self
            .observations
            .borrow()
            .iter()
            .map(|observation| observation.callback.clone())
            .collect();
        for callback in callbacks {
            callback(entries);
        }
    }

    fn targets(&self) -> Vec<NodeId> {
        self.observations
            .borrow()
            .iter()
            .map(|observation| observation.target)
            .collect()
    }

    fn len(&self) -> usize {
        self.observations.borrow().len()
    }
}

struct RegistryConnection<E> {
    id: u64,
    registry: Weak<ObservationRegistry<E>>,
}

impl<E> ObserverConnection for RegistryConnection<E> {
    fn disconnect(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .observations
                .borrow_mut()
                .retain(|observation| observation.id != self.id);
        }
        self.registry = Weak::new();
    }
}

/// Intersection observer driven by [`MemoryIntersectionObserver::trigger`]
pub struct MemoryIntersectionObserver {
    registry: Rc<ObservationRegistry<IntersectionEntry>>,
    last_options: RefCell<Option<IntersectionOptions>>,
}

impl MemoryIntersectionObserver {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(ObservationRegistry::new()),
            last_options: RefCell::new(None),
        }
    }

    /// Deliver entries to every live observation
    pub fn trigger(&self, entries: &[IntersectionEntry]) {
        self.registry.trigger(entries);
    }

    pub fn observation_count(&self) -> usize {
        self.registry.len()
    }

    pub fn observed_targets(&self) -> Vec<NodeId> {
        self.registry.targets()
    }

    /// Options passed to the most recent `observe`
    pub fn last_options(&self) -> Option<IntersectionOptions> {
        self.last_options.borrow().clone()
    }

    /// Make the next `observe` call fail
    pub fn refuse_next_observe(&self) {
        self.registry.refuse_next.set(true);
    }
}

impl Default for MemoryIntersectionObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl IntersectionObserverFactory for MemoryIntersectionObserver {
    fn observe(
        &self,
        target: &NodeHandle,
        options: &IntersectionOptions,
        callback: IntersectionCallback,
    ) -> Result<Box<dyn ObserverConnection>> {
        *self.last_options.borrow_mut() = Some(options.clone());
        self.registry.observe(target.id(), callback)
    }
}

/// Resize observer driven by [`MemoryResizeObserver::trigger`]
pub struct MemoryResizeObserver {
    registry: Rc<ObservationRegistry<ResizeEntry>>,
}

impl MemoryResizeObserver {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(ObservationRegistry::new()),
        }
    }

    /// Deliver entries to every live observation
    pub fn trigger(&self, entries: &[ResizeEntry]) {
        self.registry.trigger(entries);
    }

    pub fn observation_count(&self) -> usize {
        self.registry.len()
    }

    pub fn observed_targets(&self) -> Vec<NodeId> {
        self.registry.targets()
    }

    /// Make the next `observe` call fail
    pub fn refuse_next_observe(&self) {
        self.registry.refuse_next.set(true);
    }
}

impl Default for MemoryResizeObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResizeObserverFactory for MemoryResizeObserver {
    fn observe(
        &self,
        target: &NodeHandle,
        callback: ResizeCallback,
    ) -> Result<Box<dyn ObserverConnection>> {
        self.registry.observe(target.id(), callback)
    }
}

/// Clipboard that keeps the last written text
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: RefCell<Option<String>>,
    failing: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }

    /// Number of write attempts, failed ones included
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

#[async_trait(?Send)]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        self.writes.set(self.writes.get() + 1);
        if self.failing.get() {
            return Err(Error::clipboard("write permission denied"));
        }
        *self.contents.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

enum Route {
    Respond(FetchResponse),
    Fail(String),
}

/// HTTP client over a static route table
///
/// Unrouted URLs answer `404` with an empty body.
#[derive(Default)]
pub struct MemoryHttpClient {
    routes: RefCell<HashMap<String, Route>>,
    requests: RefCell<Vec<FetchRequest>>,
}

impl MemoryHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests to `url` with `status` and `body`
    pub fn respond(&self, url: &str, status: u16, body: &str) {
        self.routes
            .borrow_mut()
            .insert(url.to_string(), Route::Respond(FetchResponse::new(status, body)));
    }

    /// Fail requests to `url` at the transport level
    pub fn fail(&self, url: &str, message: &str) {
        self.routes
            .borrow_mut()
            .insert(url.to_string(), Route::Fail(message.to_string()));
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

#[async_trait(?Send)]
impl HttpClient for MemoryHttpClient {
    async fn send(&self, request: &FetchRequest) -> Result<FetchResponse> {
        self.requests.borrow_mut().push(request.clone());
        match self.routes.borrow().get(&request.url) {
            Some(Route::Respond(response)) => Ok(response.clone()),
            Some(Route::Fail(message)) => Err(FetchError::transport(message.clone()).into()),
            None => Ok(FetchResponse::new(404, "")),
        }
    }
}

/// Every memory seam wired together
///
/// # Example
///
/// ```rust
/// use tether_core::platform::MemoryPlatform;
///
/// let memory = MemoryPlatform::new();
/// let platform = memory.platform();
/// assert!(platform.document().is_some());
/// assert_eq!(memory.live_registrations(), 0);
/// ```
#[derive(Clone)]
pub struct MemoryPlatform {
    pub dom: MemoryDom,
    pub storage: MemoryStorage,
    pub media: Rc<MemoryMediaMatcher>,
    pub intersection: Rc<MemoryIntersectionObserver>,
    pub resize: Rc<MemoryResizeObserver>,
    pub clipboard: Rc<MemoryClipboard>,
    pub http: Rc<MemoryHttpClient>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self {
            dom: MemoryDom::new(),
            storage: MemoryStorage::new(),
            media: Rc::new(MemoryMediaMatcher::new()),
            intersection: Rc::new(MemoryIntersectionObserver::new()),
            resize: Rc::new(MemoryResizeObserver::new()),
            clipboard: Rc::new(MemoryClipboard::new()),
            http: Rc::new(MemoryHttpClient::new()),
        }
    }

    /// A platform exposing every memory seam with default configuration
    pub fn platform(&self) -> Platform {
        self.platform_with(TetherConfig::default())
    }

    /// A platform exposing every memory seam
    pub fn platform_with(&self, config: TetherConfig) -> Platform {
        Platform::headless()
            .with_config(config)
            .with_window(self.dom.window())
            .with_document(self.dom.document())
            .with_local_storage(Rc::new(self.storage.clone()))
            .with_media(self.media.clone())
            .with_intersection(self.intersection.clone())
            .with_resize(self.resize.clone())
            .with_clipboard(self.clipboard.clone())
            .with_http(self.http.clone())
    }

    /// Listeners and observations currently attached anywhere
    pub fn live_registrations(&self) -> usize {
        self.dom.listener_count()
            + self.storage.listener_count()
            + self.media.total_listener_count()
            + self.intersection.observation_count()
            + self.resize.observation_count()
    }
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting(count: &Rc<Cell<usize>>) -> Listener {
        let count = count.clone();
        Rc::new(move |_: &Event| count.set(count.get() + 1))
    }

    #[test]
    fn bubbling_reaches_ancestors_document_and_window() {
        let dom = MemoryDom::new();
        let parent = dom.create_element(None);
        let child = dom.create_element(Some(parent.id()));

        let hits = Rc::new(Cell::new(0));
        parent.add_listener(EventKind::MouseDown, counting(&hits));
        dom.document().add_listener(EventKind::MouseDown, counting(&hits));
        dom.window().add_listener(EventKind::MouseDown, counting(&hits));
        // Other kinds are filtered out
        dom.window().add_listener(EventKind::KeyDown, counting(&hits));

        dom.dispatch(EventKind::MouseDown, Some(child.id()));
        assert_eq!(hits.get(), 3);
        assert_eq!(dom.listener_count(), 4);
    }

    #[test]
    fn non_bubbling_events_stay_on_target() {
        let dom = MemoryDom::new();
        let parent = dom.create_element(None);
        let child = dom.create_element(Some(parent.id()));

        let hits = Rc::new(Cell::new(0));
        parent.add_listener(EventKind::Focus, counting(&hits));
        dom.window().add_listener(EventKind::Focus, counting(&hits));

        dom.dispatch(EventKind::Focus, Some(child.id()));
        assert_eq!(hits.get(), 0);
        dom.dispatch(EventKind::Focus, Some(parent.id()));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn handles_to_one_node_share_listeners_and_styles() {
        let dom = MemoryDom::new();
        let body = dom.body();
        let again = dom.document().body();

        let id = again.add_listener(EventKind::Wheel, Rc::new(|_: &Event| {}));
        assert_eq!(body.listener_count(), 1);
        assert!(body.remove_listener(id));

        body.set_inline_style("overflow", Some("hidden"));
        assert_eq!(again.computed_style("overflow"), "hidden");
        body.set_inline_style("overflow", None);
        assert_eq!(again.inline_style("overflow"), None);
        assert_eq!(again.computed_style("overflow"), "visible");
    }

    #[test]
    fn contains_is_inclusive_and_follows_parents() {
        let dom = MemoryDom::new();
        let outer = dom.create_element(None);
        let inner = dom.create_element(Some(outer.id()));
        let sibling = dom.create_element(None);

        assert!(outer.contains(outer.id()));
        assert!(outer.contains(inner.id()));
        assert!(!inner.contains(outer.id()));
        assert!(!outer.contains(sibling.id()));
        assert!(dom.body().contains(inner.id()));
    }

    #[test]
    fn media_listeners_fire_only_on_change() {
        let media = MemoryMediaMatcher::new();
        let list = media.match_media("(min-width: 600px)").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        list.add_change_listener(Rc::new(move |matches: bool| sink.borrow_mut().push(matches)));

        media.set_matches("(min-width: 600px)", true);
        media.set_matches("(min-width: 600px)", true);
        media.set_matches("(min-width: 600px)", false);

        assert_eq!(*seen.borrow(), vec![true, false]);
        assert!(!list.matches());
    }

    #[test]
    fn observer_disconnect_is_idempotent() {
        let dom = MemoryDom::new();
        let observer = MemoryResizeObserver::new();
        let node = dom.create_element(None).handle();

        let mut connection = observer.observe(&node, Rc::new(|_: &[ResizeEntry]| {})).unwrap();
        assert_eq!(observer.observed_targets(), vec![node.id()]);
        connection.disconnect();
        connection.disconnect();
        assert_eq!(observer.observation_count(), 0);

        observer.refuse_next_observe();
        assert!(observer.observe(&node, Rc::new(|_: &[ResizeEntry]| {})).is_err());
        assert!(observer.observe(&node, Rc::new(|_: &[ResizeEntry]| {})).is_ok());
    }
}
