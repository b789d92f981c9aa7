//! Architectural Contract Test: Idle Transitions
//!
//! This test verifies that idle detection is edge-triggered.
//!
//! Constraints verified:
//! - No activity for the threshold yields idle exactly once
//! - Activity while idle fires `on_active` exactly once
//! - Activity before the threshold postpones idle
//! - Teardown cancels the countdown
//! - A threshold change or remount while idle stays idle until activity
//!
//! If this test fails, someone has added:
//! - Level-triggered callbacks (repeated `on_idle` while idle)
//! - A countdown that survives deactivation
//! - Activity handling that skips re-arming
//! - A re-attach that silently resets idle without `on_active`

mod common;

use common::*;
use std::time::Duration;
use tether_core::Mount;
use tether_core::bindings::{Idle, IdleOptions};
use tether_core::platform::MemoryPlatform;
use tether_core::traits::{EventKind, Node};

fn options(idle: &CallCounter, active: &CallCounter) -> IdleOptions {
    IdleOptions::new()
        .idle_time(Duration::from_millis(5000))
        .on_idle(idle.callback())
        .on_active(active.callback())
}

#[tokio::test(start_paused = true)]
async fn idle_then_active_fires_each_callback_once() {
    run_local(async {
        let memory = MemoryPlatform::new();
        let (idle, active) = (CallCounter::new(), CallCounter::new());
        let binding = Mount::new(Idle::new(&memory.platform(), options(&idle, &active)))
            .expect("activation succeeds");

        advance(5001).await;
        assert!(binding.is_idle());
        assert_eq!((idle.count(), active.count()), (1, 0));

        advance(20_000).await;
        assert_eq!(idle.count(), 1, "staying idle must not fire again");

        memory.dom.dispatch(EventKind::MouseMove, None);
        assert!(!binding.is_idle());
        assert_eq!((idle.count(), active.count()), (1, 1));

        memory.dom.dispatch(EventKind::Wheel, None);
        assert_eq!(active.count(), 1, "activity while active only re-arms");

        advance(5001).await;
        assert!(binding.is_idle());
        assert_eq!(idle.count(), 2);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn activity_resets_the_countdown() {
    run_local(async {
        let memory = MemoryPlatform::new();
        let (idle, active) = (CallCounter::new(), CallCounter::new());
        let binding = Mount::new(Idle::new(&memory.platform(), options(&idle, &active)))
            .expect("activation succeeds");

        for _ in 0..5 {
            advance(4000).await;
            memory.dom.dispatch(EventKind::KeyDown, Some(memory.dom.body().id()));
        }
        assert!(!binding.is_idle());
        assert_eq!((idle.count(), active.count()), (0, 0));
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn teardown_cancels_the_countdown() {
    run_local(async {
        let memory = MemoryPlatform::new();
        let (idle, active) = (CallCounter::new(), CallCounter::new());
        let mut binding = Mount::new(Idle::new(&memory.platform(), options(&idle, &active)))
            .expect("activation succeeds");
        assert_eq!(memory.dom.window_listener_count(), 6);

        binding.unmount();
        assert_eq!(memory.dom.window_listener_count(), 0);

        advance(10_000).await;
        assert!(!binding.is_idle());
        assert_eq!(idle.count(), 0);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn reattaching_while_idle_stays_idle_until_activity() {
    run_local(async {
        let memory = MemoryPlatform::new();
        let (idle, active) = (CallCounter::new(), CallCounter::new());
        let mut binding = Mount::new(Idle::new(&memory.platform(), options(&idle, &active)))
            .expect("activation succeeds");

        advance(5001).await;
        assert_eq!((idle.count(), active.count()), (1, 0));

        binding
            .set_options(options(&idle, &active).idle_time(Duration::from_millis(3000)))
            .expect("threshold change succeeds");
        assert!(binding.is_idle(), "a new threshold must not leave idle silently");

        advance(6001).await;
        assert_eq!(idle.count(), 1, "the restarted countdown must not fire again");

        binding.remount().expect("remount succeeds");
        assert!(binding.is_idle(), "remount must not leave idle silently");
        advance(6001).await;
        assert_eq!((idle.count(), active.count()), (1, 0));

        memory.dom.dispatch(EventKind::KeyDown, None);
        assert!(!binding.is_idle());
        assert_eq!((idle.count(), active.count()), (1, 1));

        advance(3001).await;
        assert!(binding.is_idle());
        assert_eq!((idle.count(), active.count()), (2, 1));
    })
    .await;
}
