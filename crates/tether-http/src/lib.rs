// # HTTP Client
//
// This crate provides the reqwest-backed `HttpClient` for tether's fetch
// binding.
//
// ## Purpose
//
// tether-core only knows the `HttpClient` trait. Hosts that want real
// network access install this client on their platform:
//
// ```rust,no_run
// use tether_core::Platform;
// use tether_http::ReqwestHttpClient;
//
// let platform = ReqwestHttpClient::new().install(Platform::headless());
// assert!(platform.http().is_some());
// ```
//
// ## Error Mapping
//
// Every response the server produces is returned, whatever its status;
// the fetch binding decides what a non-2xx means. Failing to obtain a
// response (connect, timeout, body read) is `FetchError::Transport`.

use std::rc::Rc;

use async_trait::async_trait;
use reqwest::Method;
use tether_core::config::FetchConfig;
use tether_core::error::FetchError;
use tether_core::traits::{FetchRequest, FetchResponse, HttpClient};
use tether_core::{Error, Platform, Result};

/// HTTP client backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Create a client with the default fetch configuration
    pub fn new() -> Self {
        Self::from_config(&FetchConfig::default()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to reqwest's default client");
            Self::with_client(reqwest::Client::new())
        })
    }

    /// Create a client honouring the timeout and user agent in `config`
    pub fn from_config(config: &FetchConfig) -> Result<Self> {
        let client = Self::builder(config)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client))
    }

    /// A reqwest builder preconfigured from `config`, for further tuning
    pub fn builder(config: &FetchConfig) -> reqwest::ClientBuilder {
        let builder = reqwest::Client::builder().timeout(config.timeout());
        match &config.user_agent {
            Some(user_agent) => builder.user_agent(user_agent.as_str()),
            None => builder,
        }
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Install this client as the platform's HTTP seam
    pub fn install(self, platform: Platform) -> Platform {
        platform.with_http(Rc::new(self))
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let method = Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            Error::invalid_input(format!("Invalid HTTP method: {}", request.method))
        })?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::transport(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transport(format!("Failed to read response: {}", e)))?;

        tracing::debug!(url = %request.url, status, "response received");
        Ok(FetchResponse::new(status, body))
    }
}
