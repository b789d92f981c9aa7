// # Fetch Binding
//
// One request per request identity, surfaced as {loading, data, error}.
//
// ## States
//
// - loading: `data` and `error` are both `None`
// - settled: `loading == false` and exactly one of `data`/`error` is set
//
// A non-2xx status and a transport failure are different `FetchError`
// variants but share the error slot. No retries.
//
// ## Supersession
//
// Requests run as local tasks tied to the guard's epoch. Changing the
// request (or tearing down) aborts the in-flight task, and a response
// that still arrives checks its epoch before writing, so the latest
// request always wins.

use serde::de::DeserializeOwned;
use std::rc::Rc;

use crate::error::FetchError;
use crate::lifecycle::Lifecycle;
use crate::platform::Platform;
use crate::state::StateCell;
use crate::subscription::{Subscription, SubscriptionGuard};
use crate::traits::{FetchRequest, FetchResponse, HttpClient, LocalTask, Scheduler};
use crate::{Error, Result};

/// Exposed fetch state
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub loading: bool,
    pub data: Option<T>,
    pub error: Option<FetchError>,
}

impl<T> FetchState<T> {
    /// A request is in flight
    pub fn loading() -> Self {
        Self {
            loading: true,
            data: None,
            error: None,
        }
    }

    fn succeeded(data: T) -> Self {
        Self {
            loading: false,
            data: Some(data),
            error: None,
        }
    }

    fn failed(error: FetchError) -> Self {
        Self {
            loading: false,
            data: None,
            error: Some(error),
        }
    }
}

struct FetchInner<T> {
    http: Option<Rc<dyn HttpClient>>,
    scheduler: Option<Rc<dyn Scheduler>>,
    state: StateCell<FetchState<T>>,
}

/// Fetch-and-decode binding for JSON resources
pub struct Fetch<T> {
    inner: Rc<FetchInner<T>>,
    request: FetchRequest,
    guard: SubscriptionGuard<FetchRequest>,
}

impl<T: DeserializeOwned + Clone + 'static> Fetch<T> {
    /// Create a binding; the request is sent on activation
    pub fn new(platform: &Platform, request: impl Into<FetchRequest>) -> Self {
        Self {
            inner: Rc::new(FetchInner {
                http: platform.http(),
                scheduler: platform.scheduler(),
                state: StateCell::new(FetchState::loading()),
            }),
            request: request.into(),
            guard: SubscriptionGuard::new("fetch"),
        }
    }

    /// Snapshot of the exposed state
    pub fn state(&self) -> FetchState<T> {
        self.inner.state.get()
    }

    pub fn version(&self) -> u64 {
        self.inner.state.version()
    }

    /// Stream that yields after each state change
    pub fn changes(&self) -> tokio_stream::wrappers::WatchStream<u64> {
        self.inner.state.changes()
    }

    pub fn request(&self) -> &FetchRequest {
        &self.request
    }

    /// Switch to a new request; an active binding fetches it immediately
    pub fn set_request(&mut self, request: impl Into<FetchRequest>) -> Result<()> {
        self.request = request.into();
        if self.guard.is_active() {
            self.start(false)
        } else {
            Ok(())
        }
    }

    /// Send the current request again, superseding any in-flight attempt
    pub fn refetch(&mut self) -> Result<()> {
        if !self.guard.is_active() {
            tracing::warn!(url = %self.request.url, "refetch on an inactive fetch binding ignored");
            return Ok(());
        }
        self.start(true)
    }

    fn start(&mut self, force: bool) -> Result<()> {
        let inner = self.inner.clone();
        let attach = move |request: &FetchRequest, epoch: crate::subscription::Epoch| {
            inner.state.set(FetchState::loading());

            let (Some(http), Some(scheduler)) = (inner.http.clone(), inner.scheduler.clone())
            else {
                tracing::warn!(url = %request.url, "no HTTP client available; fetch not sent");
                inner.state.set(FetchState::failed(FetchError::Unavailable));
                return Ok(Subscription::noop("fetch"));
            };

            tracing::debug!(url = %request.url, method = %request.method, "fetch started");
            let weak = Rc::downgrade(&inner);
            let request = request.clone();
            let task: LocalTask = Box::pin(async move {
                let outcome = http.send(&request).await;
                if !epoch.is_current() {
                    tracing::debug!(url = %request.url, "discarding superseded fetch response");
                    return;
                }
                let Some(inner) = weak.upgrade() else { return };
                inner.state.set(settle::<T>(&request, outcome));
            });
            let handle = scheduler.spawn_local(task);
            Ok(Subscription::new("fetch", move || handle.abort()))
        };

        if force {
            self.guard.activate(self.request.clone(), attach)
        } else {
            self.guard.sync(self.request.clone(), attach).map(|_| ())
        }
    }
}

fn settle<T: DeserializeOwned>(
    request: &FetchRequest,
    outcome: Result<FetchResponse>,
) -> FetchState<T> {
    let decoded = outcome
        .map_err(|e| match e {
            Error::Fetch(error) => error,
            other => FetchError::transport(other.to_string()),
        })
        .and_then(|response| {
            if !response.ok() {
                return Err(FetchError::Status {
                    status: response.status,
                });
            }
            serde_json::from_str::<T>(&response.body).map_err(|e| FetchError::Decode(e.to_string()))
        });

    match decoded {
        Ok(data) => {
            tracing::debug!(url = %request.url, "fetch succeeded");
            FetchState::succeeded(data)
        }
        Err(error) => {
            tracing::warn!(url = %request.url, error = %error, "fetch failed");
            FetchState::failed(error)
        }
    }
}

impl<T: DeserializeOwned + Clone + 'static> Lifecycle for Fetch<T> {
    fn activate(&mut self) -> Result<()> {
        self.start(false)
    }

    fn deactivate(&mut self) {
        self.guard.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mount;

    #[test]
    fn state_is_loading_before_activation() {
        let fetch: Fetch<serde_json::Value> =
            Fetch::new(&Platform::headless(), "https://example.test");
        assert_eq!(fetch.state(), FetchState::loading());
    }

    #[test]
    fn missing_http_client_settles_with_unavailable() {
        let fetch: Fetch<serde_json::Value> =
            Fetch::new(&Platform::headless(), "https://example.test");
        let mounted = Mount::new(fetch).unwrap();
        let state = mounted.state();
        assert!(!state.loading);
        assert_eq!(state.data, None);
        assert_eq!(state.error, Some(FetchError::Unavailable));
    }

    #[test]
    fn status_and_decode_failures_are_distinct() {
        let request = FetchRequest::get("https://example.test");
        let status: FetchState<u32> = settle(&request, Ok(FetchResponse::new(500, "1")));
        assert_eq!(status.error, Some(FetchError::Status { status: 500 }));
        assert_eq!(
            status.error.map(|e| e.to_string()).as_deref(),
            Some("Network response was not ok")
        );

        let decode: FetchState<u32> = settle(&request, Ok(FetchResponse::new(200, "nope")));
        assert!(matches!(decode.error, Some(FetchError::Decode(_))));

        let ok: FetchState<u32> = settle(&request, Ok(FetchResponse::new(200, "7")));
        assert_eq!(ok.data, Some(7));
    }
}
