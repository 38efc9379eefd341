//! Mock transport for testing
//!
//! Returns queued responses without making real network calls and records
//! every request so tests can assert on attempts and headers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{HttpRequest, HttpResponse, Transport};
use crate::error::Result;

type Responder = dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync;

/// Mock transport that returns predefined responses
#[derive(Clone)]
pub struct MockTransport {
    /// Queue of responses to return (FIFO)
    responses: Arc<Mutex<Vec<HttpResponse>>>,
    /// Used when the queue is empty
    responder: Arc<Responder>,
    /// Every request sent (for assertions)
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// Answers `200 {}` to everything
    pub fn new() -> Self {
        Self::with_responder(|_| HttpResponse::ok("{}"))
    }

    /// Create with a queue of responses; `200 {}` once drained
    pub fn with_responses(responses: Vec<HttpResponse>) -> Self {
        let mock = Self::new();
        *lock(&mock.responses) = responses;
        mock
    }

    /// Compute each response from the request (used once the queue is empty)
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        Self {
            responses: Arc::new(Mutex::new(vec![])),
            responder: Arc::new(responder),
            requests: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Answer every request with `status` and an empty JSON object
    pub fn always(status: u16) -> Self {
        Self::with_responder(move |_| HttpResponse::new(status, "{}"))
    }

    /// All requests sent so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let queued = {
            let mut queue = lock(&self.responses);
            if queue.is_empty() {
                None
            } else {
                Some(queue.remove(0))
            }
        };

        let response = queued.unwrap_or_else(|| (self.responder)(&request));
        lock(&self.requests).push(request);

        Ok(response)
    }
}
