// # Clipboard Binding
//
// Copies text and exposes a transient "copied" flag plus the last error.
//
// ## Behavior
//
// - Success: `copied = true`, `error = None`, and a revert timer
//   (default 2000 ms) flips `copied` back to false.
// - Failure: `copied = false`, `error = "Failed to copy"`, pending revert
//   cancelled. The cause is logged, not exposed.
// - Every call supersedes the previous one. A write that resolves after
//   a newer call started does not touch state.

use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::Result;
use crate::lifecycle::Lifecycle;
use crate::platform::Platform;
use crate::state::StateCell;
use crate::timer::Timeout;
use crate::traits::Clipboard;

/// Message exposed for every failed copy
pub const COPY_FAILED: &str = "Failed to copy";

struct ClipboardInner {
    clipboard: Option<Rc<dyn Clipboard>>,
    copied: StateCell<bool>,
    error: StateCell<Option<String>>,
    attempt: Cell<u64>,
    revert: Timeout,
    reset_after: Duration,
}

impl ClipboardInner {
    fn fail(&self, cause: &str) {
        tracing::warn!(cause, "clipboard copy failed");
        self.revert.cancel();
        self.copied.set_if_changed(false);
        self.error.set(Some(COPY_FAILED.to_string()));
    }
}

/// Clipboard copy with a transient success flag
pub struct ClipboardBinding {
    inner: Rc<ClipboardInner>,
}

impl ClipboardBinding {
    pub fn new(platform: &Platform) -> Self {
        Self {
            inner: Rc::new(ClipboardInner {
                clipboard: platform.clipboard(),
                copied: StateCell::new(false),
                error: StateCell::new(None),
                attempt: Cell::new(0),
                revert: Timeout::new("clipboard-reset", platform.scheduler()),
                reset_after: platform.config().clipboard.reset_after(),
            }),
        }
    }

    /// Whether the last copy succeeded and has not yet reverted
    pub fn is_copied(&self) -> bool {
        self.inner.copied.get()
    }

    /// Message of the last failed copy
    pub fn error(&self) -> Option<String> {
        self.inner.error.get()
    }

    /// Change counter covering both `copied` and `error`
    pub fn version(&self) -> u64 {
        self.inner.copied.version() + self.inner.error.version()
    }

    /// A copy function for event handlers
    pub fn copy_handle(&self) -> CopyHandle {
        CopyHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Copy `text`; see [`CopyHandle::copy`]
    pub async fn copy(&self, text: &str) -> bool {
        self.copy_handle().copy(text).await
    }
}

impl Lifecycle for ClipboardBinding {
    fn activate(&mut self) -> Result<()> {
        Ok(())
    }

    /// Cancel the revert timer and orphan any in-flight write
    fn deactivate(&mut self) {
        self.inner.attempt.set(self.inner.attempt.get() + 1);
        self.inner.revert.cancel();
    }
}

/// Cloneable copy control
#[derive(Clone)]
pub struct CopyHandle {
    inner: Weak<ClipboardInner>,
}

impl CopyHandle {
    /// Write `text` to the clipboard
    ///
    /// # Returns
    ///
    /// Whether the write succeeded. `false` also after the binding was
    /// disposed, in which case nothing is attempted.
    pub async fn copy(&self, text: &str) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            tracing::warn!("copy called on a disposed clipboard binding");
            return false;
        };
        let attempt = inner.attempt.get() + 1;
        inner.attempt.set(attempt);

        let Some(clipboard) = inner.clipboard.clone() else {
            inner.fail("no clipboard available");
            return false;
        };
        drop(inner);

        let outcome = clipboard.write_text(text).await;

        let Some(inner) = self.inner.upgrade() else {
            tracing::debug!("clipboard binding disposed while copying");
            return outcome.is_ok();
        };
        if inner.attempt.get() != attempt {
            tracing::debug!("clipboard copy superseded; result dropped");
            return outcome.is_ok();
        }

        match outcome {
            Ok(()) => {
                inner.error.set_if_changed(None);
                inner.copied.set_if_changed(true);
                let weak = self.inner.clone();
                inner.revert.schedule(inner.reset_after, move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.copied.set(false);
                    }
                });
                true
            }
            Err(e) => {
                inner.fail(&e.to_string());
                false
            }
        }
    }
}
