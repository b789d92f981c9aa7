//! Task scheduling seam
//!
//! Timers and in-flight requests are local (non-`Send`) tasks. The
//! scheduler spawns them on the UI thread and hands back a handle that
//! can abort them.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// A boxed task that runs on the local thread
pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Handle to a spawned task
///
/// Dropping the handle does not abort the task; call [`TaskHandle::abort`].
pub struct TaskHandle {
    abort: Option<Box<dyn FnOnce()>>,
}

impl TaskHandle {
    /// Create a handle that runs `abort` when the task is aborted
    pub fn new(abort: impl FnOnce() + 'static) -> Self {
        Self {
            abort: Some(Box::new(abort)),
        }
    }

    /// A handle for a task that cannot be aborted
    pub fn detached() -> Self {
        Self { abort: None }
    }

    /// Abort the task; a task that already completed is unaffected
    pub fn abort(mut self) {
        if let Some(abort) = self.abort.take() {
            abort();
        }
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("abortable", &self.abort.is_some())
            .finish()
    }
}

/// Trait for local task schedulers
pub trait Scheduler {
    /// Spawn `task` on the local thread
    fn spawn_local(&self, task: LocalTask) -> TaskHandle;

    /// A future that completes after `duration`
    ///
    /// The deadline is fixed when this is called, not when it is first polled.
    fn sleep(&self, duration: Duration) -> LocalTask;
}
