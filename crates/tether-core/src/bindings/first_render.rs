//! First-render flag
//!
//! `true` while the owning component renders for the first time, `false`
//! from the first commit on. Remounting never resets it.

use crate::Result;
use crate::lifecycle::Lifecycle;

#[derive(Debug)]
pub struct FirstRender {
    first: bool,
}

impl FirstRender {
    pub fn new() -> Self {
        Self { first: true }
    }

    pub fn is_first(&self) -> bool {
        self.first
    }
}

impl Default for FirstRender {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle for FirstRender {
    fn activate(&mut self) -> Result<()> {
        self.first = false;
        Ok(())
    }

    fn deactivate(&mut self) {}

    fn committed(&mut self) {
        self.first = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mount;

    #[test]
    fn stays_false_across_remounts() {
        let mut mounted = Mount::new(FirstRender::new()).unwrap();
        assert!(!mounted.is_first());
        mounted.remount().unwrap();
        mounted.rerender();
        assert!(!mounted.is_first());
    }
}
