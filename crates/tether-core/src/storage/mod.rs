// # Storage Area Implementations
//
// This module provides implementations of the StorageArea trait for
// different persistence strategies, and builds the one a configuration
// asks for.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::rc::Rc;

use crate::Result;
use crate::config::StorageConfig;
use crate::traits::StorageArea;

/// Build the storage area described by `config`
///
/// # Returns
///
/// `None` for [`StorageConfig::Disabled`]: bindings then behave as in a
/// non-interactive context.
pub fn open(config: &StorageConfig) -> Result<Option<Rc<dyn StorageArea>>> {
    let area: Option<Rc<dyn StorageArea>> = match config {
        StorageConfig::Memory => Some(Rc::new(MemoryStorage::new())),
        StorageConfig::File { path } => Some(Rc::new(FileStorage::open(path)?)),
        StorageConfig::Disabled => None,
    };
    tracing::debug!(backend = config.type_name(), "Opened storage backend");
    Ok(area)
}
