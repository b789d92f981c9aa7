// # Timeout Coordinator
//
// At most one pending delayed action per instance.
//
// ## Supersession
//
// `schedule` always cancels the previous action first. Each armed
// action also remembers the generation it was armed in and re-checks it
// after sleeping, so a superseded action never runs even when aborting
// its task raced with the wake-up.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::traits::{LocalTask, Scheduler, TaskHandle};

struct TimeoutState {
    generation: Cell<u64>,
    pending: RefCell<Option<TaskHandle>>,
}

/// A cancellable, re-armable single timer
///
/// Dropping the timeout cancels any pending action.
pub struct Timeout {
    name: &'static str,
    scheduler: Option<Rc<dyn Scheduler>>,
    state: Rc<TimeoutState>,
}

impl Timeout {
    /// Create an idle timer; without a scheduler every `schedule` is a no-op
    pub fn new(name: &'static str, scheduler: Option<Rc<dyn Scheduler>>) -> Self {
        Self {
            name,
            scheduler,
            state: Rc::new(TimeoutState {
                generation: Cell::new(0),
                pending: RefCell::new(None),
            }),
        }
    }

    /// Cancel any pending action, then run `action` after `after`
    ///
    /// # Returns
    ///
    /// `false` when no scheduler is available and nothing was armed.
    pub fn schedule(&self, after: Duration, action: impl FnOnce() + 'static) -> bool {
        self.cancel();
        let Some(scheduler) = &self.scheduler else {
            tracing::warn!(timer = self.name, "no scheduler available; timer not armed");
            return false;
        };

        let armed_in = self.state.generation.get();
        let state = Rc::downgrade(&self.state);
        let sleep = scheduler.sleep(after);
        let name = self.name;
        let task: LocalTask = Box::pin(async move {
            sleep.await;
            let Some(state) = state.upgrade() else { return };
            if state.generation.get() != armed_in {
                return;
            }
            let finished = state.pending.borrow_mut().take();
            drop(finished);
            tracing::trace!(timer = name, "timer fired");
            action();
        });

        let handle = scheduler.spawn_local(task);
        *self.state.pending.borrow_mut() = Some(handle);
        tracing::trace!(timer = self.name, after_ms = after.as_millis() as u64, "timer armed");
        true
    }

    /// Cancel the pending action; calling with nothing pending is a no-op
    ///
    /// # Returns
    ///
    /// `true` if an action was pending.
    pub fn cancel(&self) -> bool {
        self.state.generation.set(self.state.generation.get() + 1);
        let pending = self.state.pending.borrow_mut().take();
        match pending {
            Some(handle) => {
                handle.abort();
                tracing::trace!(timer = self.name, "timer cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state.pending.borrow().is_some()
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeout")
            .field("name", &self.name)
            .field("pending", &self.is_pending())
            .finish()
    }
}
