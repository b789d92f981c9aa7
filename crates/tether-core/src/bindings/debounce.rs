//! Value debounce
//!
//! Exposes the input value only once it has been stable for the delay.
//! The initial value is exposed immediately. Each new input re-arms the
//! timer, so a burst of inputs exposes only the last one.

use std::rc::Rc;
use std::time::Duration;

use crate::Result;
use crate::lifecycle::Lifecycle;
use crate::platform::Platform;
use crate::state::StateCell;
use crate::timer::Timeout;

/// Debounced view of a changing value
pub struct Debounced<T> {
    value: Rc<StateCell<T>>,
    input: T,
    delay: Duration,
    timer: Timeout,
}

impl<T: Clone + PartialEq + 'static> Debounced<T> {
    /// Create a debounced value
    ///
    /// `delay` defaults to the platform's configured debounce delay.
    pub fn new(platform: &Platform, initial: T, delay: Option<Duration>) -> Self {
        Self {
            value: Rc::new(StateCell::new(initial.clone())),
            input: initial,
            delay: delay.unwrap_or_else(|| platform.config().debounce.delay()),
            timer: Timeout::new("debounce", platform.scheduler()),
        }
    }

    /// The exposed (debounced) value
    pub fn get(&self) -> T {
        self.value.get()
    }

    /// The most recent input
    pub fn input(&self) -> &T {
        &self.input
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether an input is waiting to be exposed
    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    pub fn version(&self) -> u64 {
        self.value.version()
    }

    /// Feed a new input; an input equal to the previous one is ignored
    pub fn set_input(&mut self, input: T) {
        if input == self.input {
            return;
        }
        self.input = input;
        self.arm();
    }

    /// Change the delay, re-arming a pending input with the new delay
    pub fn set_delay(&mut self, delay: Duration) {
        if delay == self.delay {
            return;
        }
        self.delay = delay;
        if self.timer.is_pending() {
            self.arm();
        }
    }

    fn arm(&self) {
        let value = Rc::downgrade(&self.value);
        let input = self.input.clone();
        let armed = self.timer.schedule(self.delay, move || {
            if let Some(value) = value.upgrade() {
                value.set_if_changed(input);
            }
        });
        if !armed {
            // No scheduler: pass the input straight through
            self.value.set_if_changed(self.input.clone());
        }
    }
}

impl<T: Clone + PartialEq + 'static> Lifecycle for Debounced<T> {
    /// Resume an input that was still pending at the last deactivation
    fn activate(&mut self) -> Result<()> {
        if !self.value.with(|value| *value == self.input) {
            self.arm();
        }
        Ok(())
    }

    fn deactivate(&mut self) {
        self.timer.cancel();
    }
}
