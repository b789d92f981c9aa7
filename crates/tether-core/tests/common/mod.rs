//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that let contract tests
//! control when async platform calls complete and count what bindings
//! register.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use tether_core::error::{Error, FetchError, Result};
use tether_core::traits::{
    FetchRequest, FetchResponse, HttpClient, ListenerId, StorageArea, StorageListener,
};
use tokio::sync::oneshot;

/// Run `future` inside a fresh `LocalSet`
pub async fn run_local<F: Future>(future: F) -> F::Output {
    tokio::task::LocalSet::new().run_until(future).await
}

/// Let every ready local task run
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// Move the paused clock forward, then let woken tasks run
pub async fn advance(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    settle().await;
}

/// An HTTP client whose responses are released by the test
///
/// Every `send` parks until [`GatedHttpClient::release`] answers it.
/// Dropping a parked request's gate fails it at the transport level.
#[derive(Default)]
pub struct GatedHttpClient {
    parked: RefCell<Vec<(String, oneshot::Sender<FetchResponse>)>>,
    requests: RefCell<Vec<FetchRequest>>,
}

impl GatedHttpClient {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Answer the oldest parked request for `url`
    ///
    /// Returns `false` when nothing is parked for `url` (or the request
    /// was aborted and is no longer listening).
    pub fn release(&self, url: &str, status: u16, body: &str) -> bool {
        let position = self.parked.borrow().iter().position(|(parked, _)| parked == url);
        let Some(position) = position else {
            return false;
        };
        let (_, gate) = self.parked.borrow_mut().remove(position);
        gate.send(FetchResponse::new(status, body)).is_ok()
    }

    /// Requests still waiting for a response
    pub fn parked_count(&self) -> usize {
        self.parked.borrow().iter().filter(|(_, gate)| !gate.is_closed()).count()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|request| request.url.clone()).collect()
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for GatedHttpClient {
    async fn send(&self, request: &FetchRequest) -> Result<FetchResponse> {
        self.requests.borrow_mut().push(request.clone());
        let (gate, response) = oneshot::channel();
        self.parked.borrow_mut().push((request.url.clone(), gate));
        response
            .await
            .map_err(|_| Error::from(FetchError::transport("gate dropped")))
    }
}

/// A storage area that reads a fixed value and refuses every write
pub struct FailingStorage {
    stored: Option<String>,
    write_attempts: Cell<usize>,
    subscriptions: Cell<usize>,
}

impl FailingStorage {
    pub fn new(stored: Option<&str>) -> Rc<Self> {
        Rc::new(Self {
            stored: stored.map(str::to_string),
            write_attempts: Cell::new(0),
            subscriptions: Cell::new(0),
        })
    }

    pub fn write_attempts(&self) -> usize {
        self.write_attempts.get()
    }

    pub fn live_subscriptions(&self) -> usize {
        self.subscriptions.get()
    }
}

impl StorageArea for FailingStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Ok(self.stored.clone())
    }

    fn set_item(&self, key: &str, _value: &str) -> Result<()> {
        self.write_attempts.set(self.write_attempts.get() + 1);
        Err(Error::storage(format!("Quota exceeded writing '{}'", key)))
    }

    fn remove_item(&self, _key: &str) -> Result<()> {
        Err(Error::storage("storage is read-only"))
    }

    fn clear(&self) -> Result<()> {
        Err(Error::storage("storage is read-only"))
    }

    fn subscribe(&self, _listener: StorageListener) -> ListenerId {
        self.subscriptions.set(self.subscriptions.get() + 1);
        ListenerId(self.subscriptions.get() as u64)
    }

    fn unsubscribe(&self, _id: ListenerId) -> bool {
        self.subscriptions.set(self.subscriptions.get().saturating_sub(1));
        true
    }
}

/// Counts invocations of the callbacks it hands out
#[derive(Clone, Default)]
pub struct CallCounter {
    count: Rc<Cell<usize>>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> impl Fn() + 'static {
        let count = self.count.clone();
        move || count.set(count.get() + 1)
    }

    pub fn event_callback<E: ?Sized + 'static>(&self) -> impl Fn(&E) + 'static {
        let count = self.count.clone();
        move |_: &E| count.set(count.get() + 1)
    }

    pub fn count(&self) -> usize {
        self.count.get()
    }
}
