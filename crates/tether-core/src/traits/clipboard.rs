//! Clipboard access

use async_trait::async_trait;

use crate::Result;

/// Trait for writing text to the system clipboard
#[async_trait(?Send)]
pub trait Clipboard {
    /// Replace the clipboard contents with `text`
    ///
    /// # Errors
    ///
    /// Fails when the platform refuses the write (permissions, focus).
    async fn write_text(&self, text: &str) -> Result<()>;
}
