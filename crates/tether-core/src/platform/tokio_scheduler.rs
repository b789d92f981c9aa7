//! Scheduler backed by tokio's local task set

use std::time::Duration;

use crate::traits::{LocalTask, Scheduler, TaskHandle};

/// Spawns tasks with [`tokio::task::spawn_local`]
///
/// Bindings that schedule work (timers, fetches) must run inside a
/// [`tokio::task::LocalSet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl TokioScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for TokioScheduler {
    fn spawn_local(&self, task: LocalTask) -> TaskHandle {
        let handle = tokio::task::spawn_local(task);
        TaskHandle::new(move || handle.abort())
    }

    fn sleep(&self, duration: Duration) -> LocalTask {
        Box::pin(tokio::time::sleep(duration))
    }
}
