//! Architectural Contract Test: Debounce
//!
//! This test verifies that a burst of inputs exposes only the last one.
//!
//! Constraints verified:
//! - The initial value is exposed immediately
//! - Intermediate inputs of a burst are never exposed
//! - The last input appears no earlier than the delay after it
//! - Deactivation cancels a pending input
//!
//! If this test fails, someone has added:
//! - Timers that are not superseded by newer inputs
//! - Leading-edge emission
//! - Timers that outlive deactivation

mod common;

use common::*;
use std::time::Duration;
use tether_core::bindings::Debounced;
use tether_core::{Mount, Platform};

#[tokio::test(start_paused = true)]
async fn burst_exposes_only_the_last_input() {
    run_local(async {
        let platform = Platform::headless();
        let mut search = Mount::new(Debounced::new(
            &platform,
            String::new(),
            Some(Duration::from_millis(300)),
        ))
        .expect("activation succeeds");

        for text in ["r", "ru", "rus", "rust"] {
            search.set_input(text.to_string());
            advance(100).await;
            assert_eq!(search.get(), "");
        }

        advance(190).await;
        assert_eq!(search.get(), "", "not before the delay has passed");
        advance(10).await;
        assert_eq!(search.get(), "rust");
        assert_eq!(search.version(), 1, "exactly one exposure");
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn delay_change_rearms_pending_input() {
    run_local(async {
        let platform = Platform::headless();
        let mut value = Mount::new(Debounced::new(&platform, 0, Some(Duration::from_millis(100))))
            .expect("activation succeeds");

        value.set_input(1);
        advance(50).await;
        value.set_delay(Duration::from_millis(500));
        advance(100).await;
        assert_eq!(value.get(), 0);

        advance(450).await;
        assert_eq!(value.get(), 1);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn deactivation_cancels_and_activation_resumes() {
    run_local(async {
        let platform = Platform::headless();
        let mut value = Mount::new(Debounced::new(&platform, 0, Some(Duration::from_millis(100))))
            .expect("activation succeeds");

        value.set_input(7);
        value.unmount();
        advance(200).await;
        assert_eq!(value.get(), 0);
        assert!(!value.is_pending());

        value.remount().expect("reactivation succeeds");
        advance(150).await;
        assert_eq!(value.get(), 7);
    })
    .await;
}
