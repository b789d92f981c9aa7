//! Architectural Contract Test: Click Outside
//!
//! This test verifies containment-based dispatch of outside presses.
//!
//! Constraints verified:
//! - A press on the node or a descendant never fires
//! - Any other press fires exactly once per event
//! - An empty slot never fires
//! - One document listener per armed binding, none after teardown
//!
//! If this test fails, someone has added:
//! - Listeners registered per render
//! - Containment checks against a stale node
//! - Callbacks fired outside the armed window

mod common;

use common::*;
use tether_core::bindings::ClickOutside;
use tether_core::platform::MemoryPlatform;
use tether_core::traits::{Event, EventKind, Node};
use tether_core::{Mount, NodeRef};

#[test]
fn descendants_are_inside_everything_else_is_outside() {
    let memory = MemoryPlatform::new();
    let menu = memory.dom.create_element(None);
    let item = memory.dom.create_element(Some(menu.id()));
    let icon = memory.dom.create_element(Some(item.id()));
    let elsewhere = memory.dom.create_element(None);

    let outside = CallCounter::new();
    let binding = ClickOutside::new(&memory.platform(), outside.event_callback::<Event>(), None);
    binding.node_ref().set(Some(menu.handle()));
    let _mounted = Mount::new(binding).expect("activation succeeds");

    for target in [menu.id(), item.id(), icon.id()] {
        memory.dom.dispatch(EventKind::MouseDown, Some(target));
    }
    assert_eq!(outside.count(), 0);

    memory.dom.dispatch(EventKind::MouseDown, Some(elsewhere.id()));
    memory.dom.dispatch(EventKind::MouseDown, Some(memory.dom.body().id()));
    memory.dom.dispatch(EventKind::MouseDown, None);
    assert_eq!(outside.count(), 3);

    memory.dom.dispatch(EventKind::KeyDown, Some(elsewhere.id()));
    assert_eq!(outside.count(), 3, "only pointer presses count");
}

#[test]
fn empty_slot_never_fires_and_slot_is_read_per_event() {
    let memory = MemoryPlatform::new();
    let panel = memory.dom.create_element(None);
    let slot = NodeRef::new();

    let outside = CallCounter::new();
    let binding = ClickOutside::new(
        &memory.platform(),
        outside.event_callback::<Event>(),
        Some(slot.clone()),
    );
    let _mounted = Mount::new(binding).expect("activation succeeds");

    memory.dom.dispatch(EventKind::MouseDown, None);
    assert_eq!(outside.count(), 0);

    slot.set(Some(panel.handle()));
    memory.dom.dispatch(EventKind::MouseDown, None);
    assert_eq!(outside.count(), 1);
    assert_eq!(memory.dom.document_listener_count(), 1);
}

#[test]
fn nothing_fires_after_teardown() {
    let memory = MemoryPlatform::new();
    let panel = memory.dom.create_element(None);
    let outside = CallCounter::new();
    let binding = ClickOutside::new(
        &memory.platform(),
        outside.event_callback::<Event>(),
        Some(NodeRef::with_node(panel.handle())),
    );

    let mut mounted = Mount::new(binding).expect("activation succeeds");
    mounted.unmount();
    memory.dom.dispatch(EventKind::MouseDown, None);

    assert_eq!(outside.count(), 0);
    assert_eq!(memory.dom.document_listener_count(), 0);
    assert!(!mounted.is_armed());
}
