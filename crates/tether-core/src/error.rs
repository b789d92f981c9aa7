//! Error types for tether
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for tether operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tether
#[derive(Error, Debug)]
pub enum Error {
    /// A platform resource is not present in this execution context
    #[error("Resource unavailable: {0}")]
    Unavailable(String),

    /// Storage backend errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored or supplied value could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Observer primitive errors (intersection, resize)
    #[error("Observer error: {0}")]
    Observer(String),

    /// Clipboard write errors
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Network fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A control handle outlived its binding
    #[error("Binding disposed: {0}")]
    Disposed(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a resource-unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create an observer error
    pub fn observer(msg: impl Into<String>) -> Self {
        Self::Observer(msg.into())
    }

    /// Create a clipboard error
    pub fn clipboard(msg: impl Into<String>) -> Self {
        Self::Clipboard(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a disposed-binding error
    pub fn disposed(binding: impl Into<String>) -> Self {
        Self::Disposed(binding.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// Failure surfaced through a fetch binding's error slot
///
/// Transport failures and non-success statuses are distinct variants but
/// land in the same slot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-2xx status
    #[error("Network response was not ok")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body did not decode into the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// No HTTP client is installed on the platform
    #[error("No HTTP client available")]
    Unavailable,
}

impl FetchError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// The HTTP status, for status errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }
}
