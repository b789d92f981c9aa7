//! Previous value
//!
//! Reports the value passed on the previous render. A render stages the
//! new value with [`Previous::track`]; the staged value becomes "previous"
//! only once that render commits.

use crate::Result;
use crate::lifecycle::Lifecycle;

/// The value from the last committed render
#[derive(Debug, Clone, Default)]
pub struct Previous<T> {
    committed: Option<T>,
    staged: Option<T>,
}

impl<T: Clone> Previous<T> {
    pub fn new() -> Self {
        Self {
            committed: None,
            staged: None,
        }
    }

    /// Stage `value` for this render
    ///
    /// # Returns
    ///
    /// The value of the previous committed render, `None` on the first.
    pub fn track(&mut self, value: T) -> Option<T> {
        self.staged = Some(value);
        self.committed.clone()
    }

    /// Value of the previous committed render
    pub fn get(&self) -> Option<&T> {
        self.committed.as_ref()
    }

    fn commit(&mut self) {
        if let Some(staged) = self.staged.take() {
            self.committed = Some(staged);
        }
    }
}

impl<T: Clone> Lifecycle for Previous<T> {
    fn activate(&mut self) -> Result<()> {
        self.commit();
        Ok(())
    }

    fn deactivate(&mut self) {}

    fn committed(&mut self) {
        self.commit();
    }
}
