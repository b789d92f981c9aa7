//! Architectural Contract Test: Scroll Lock Restore
//!
//! This test verifies that scroll locking never leaves a layout mutation
//! behind.
//!
//! Constraints verified:
//! - Unlock restores overflow and padding exactly, absent values included
//! - Teardown while locked restores the pre-lock styles
//! - Teardown without a lock touches nothing
//! - The lock pads by exactly the scrollbar width plus existing padding
//!
//! If this test fails, someone has added:
//! - Snapshots taken after styles were modified
//! - Teardown paths that skip unlocking
//! - Padding computed from the wrong metric

mod common;

use tether_core::bindings::ScrollLock;
use tether_core::platform::MemoryPlatform;
use tether_core::traits::Node;
use tether_core::{Mount, NodeRef};

fn styles(node: &dyn Node) -> (Option<String>, Option<String>) {
    (node.inline_style("overflow"), node.inline_style("padding-right"))
}

#[test]
fn lock_then_unlock_restores_exactly() {
    let memory = MemoryPlatform::new();
    let body = memory.dom.body();
    body.set_inline_style("overflow", Some("scroll"));
    body.set_inline_style("padding-right", Some("4px"));
    body.set_widths(817.0, 800.0);
    let before = styles(&*body);

    let lock = Mount::new(ScrollLock::new(&memory.platform(), None)).expect("activation succeeds");
    lock.lock();
    assert_eq!(body.inline_style("overflow").as_deref(), Some("hidden"));
    assert_eq!(body.inline_style("padding-right").as_deref(), Some("21px"));

    lock.unlock();
    assert_eq!(styles(&*body), before);
    assert!(!lock.is_locked());
}

#[test]
fn teardown_while_locked_restores_absent_styles() {
    let memory = MemoryPlatform::new();
    let dialog = memory.dom.create_element(None);
    dialog.set_widths(300.0, 285.0);

    let lock = Mount::new(ScrollLock::new(
        &memory.platform(),
        Some(NodeRef::with_node(dialog.handle())),
    ))
    .expect("activation succeeds");
    let controls = lock.controls();
    controls.lock();
    assert_eq!(dialog.inline_style("padding-right").as_deref(), Some("15px"));

    drop(lock);
    assert_eq!(styles(&*dialog), (None, None));
}

#[test]
fn teardown_without_lock_is_a_no_op() {
    let memory = MemoryPlatform::new();
    let body = memory.dom.body();
    body.set_inline_style("overflow", Some("auto"));

    let mut lock =
        Mount::new(ScrollLock::new(&memory.platform(), None)).expect("activation succeeds");
    lock.unlock();
    lock.unmount();

    assert_eq!(styles(&*body), (Some("auto".to_string()), None));
}

#[test]
fn relocking_after_unlock_takes_a_fresh_snapshot() {
    let memory = MemoryPlatform::new();
    let body = memory.dom.body();
    let lock = Mount::new(ScrollLock::new(&memory.platform(), None)).expect("activation succeeds");

    lock.lock();
    lock.unlock();
    body.set_inline_style("overflow", Some("clip"));
    lock.lock();
    drop(lock);

    assert_eq!(body.inline_style("overflow").as_deref(), Some("clip"));
}
