// # HTTP Client Trait
//
// Defines the interface the fetch binding uses to perform a single
// request.
//
// ## Identity
//
// `FetchRequest` is both the request description and the fetch
// binding's resource identity: two requests compare equal exactly when
// they would produce the same network call.
//
// ## Implementations
//
// - `MemoryHttpClient` (this crate): static routes for tests
// - `ReqwestHttpClient` (tether-http): real network access

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Result;

/// A request description (URL plus options)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Target URL
    pub url: String,

    /// HTTP method
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request body
    #[serde(default)]
    pub body: Option<String>,
}

impl FetchRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Set the method
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl From<&str> for FetchRequest {
    fn from(url: &str) -> Self {
        Self::get(url)
    }
}

impl From<String> for FetchRequest {
    fn from(url: String) -> Self {
        Self::get(url)
    }
}

fn default_method() -> String {
    "GET".to_string()
}

/// A completed response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl FetchResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for HTTP client implementations
///
/// # Returns
///
/// Any response the server produced, including non-2xx statuses.
/// Only failures to obtain a response are errors; implementations
/// report those as `Error::Fetch(FetchError::Transport)`.
#[async_trait(?Send)]
pub trait HttpClient {
    /// Perform one request
    async fn send(&self, request: &FetchRequest) -> Result<FetchResponse>;
}
