// # Lifecycle
//
// The contract between a binding and the composition layer that owns it.
//
// ## Contract
//
// - `activate` runs once per activation: on first mount and after every
//   explicit dependency change.
// - `deactivate` runs exactly once per activation, before the next
//   `activate` and after final disposal.
// - `committed` runs after every render commit. Bindings that re-read a
//   node reference or commit a staged value do it here.
//
// `Mount` is a reference driver for this contract. It activates on
// construction and deactivates on drop, so no activation can outlive
// the mount.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::Result;

/// Trait for lifecycle-managed bindings
pub trait Lifecycle {
    /// Acquire external resources and start observing them
    ///
    /// # Errors
    ///
    /// Only for attach failures a caller can act on. Unavailable
    /// resources are not errors; the binding falls back instead.
    fn activate(&mut self) -> Result<()>;

    /// Release everything `activate` acquired; must be idempotent
    fn deactivate(&mut self);

    /// Post-render completion signal
    fn committed(&mut self) {}
}

/// Drives one binding through the lifecycle contract
///
/// # Example
///
/// ```rust
/// use tether_core::Mount;
/// use tether_core::bindings::FirstRender;
///
/// let binding = FirstRender::new();
/// assert!(binding.is_first());
///
/// let mounted = Mount::new(binding).unwrap();
/// assert!(!mounted.is_first());
/// ```
pub struct Mount<B: Lifecycle> {
    binding: B,
    active: bool,
}

impl<B: Lifecycle> Mount<B> {
    /// Activate `binding`
    ///
    /// # Errors
    ///
    /// Returns the activation error; the binding is dropped.
    pub fn new(mut binding: B) -> Result<Self> {
        binding.activate()?;
        Ok(Self {
            binding,
            active: true,
        })
    }

    /// Signal a completed render
    pub fn rerender(&mut self) {
        self.binding.committed();
    }

    /// Deactivate then activate again, as after a dependency change
    pub fn remount(&mut self) -> Result<()> {
        self.unmount();
        self.binding.activate()?;
        self.active = true;
        Ok(())
    }

    /// Deactivate without dropping; later calls are no-ops
    pub fn unmount(&mut self) {
        if self.active {
            self.active = false;
            self.binding.deactivate();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl<B: Lifecycle> Deref for Mount<B> {
    type Target = B;

    fn deref(&self) -> &B {
        &self.binding
    }
}

impl<B: Lifecycle> DerefMut for Mount<B> {
    fn deref_mut(&mut self) -> &mut B {
        &mut self.binding
    }
}

impl<B: Lifecycle> Drop for Mount<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<B: Lifecycle> fmt::Debug for Mount<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mount")
            .field("binding", &std::any::type_name::<B>())
            .field("active", &self.active)
            .finish()
    }
}
