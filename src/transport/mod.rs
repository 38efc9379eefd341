//! # Transport Abstraction Layer
//!
//! Trait and implementations for sending one HTTP request to the API.
//!
//! - [`Transport`] - Core trait: send a request, return status + body
//! - [`HttpTransport`] - Production transport backed by `reqwest`
//! - [`MockTransport`] - Test transport with queued responses and request recording
//!
//! Auth and retry live above this layer in [`crate::client::ApiClient`];
//! a transport only moves bytes.

mod http;
mod mock;

pub(crate) use http::build_client;
pub use http::HttpTransport;
pub use mock::MockTransport;

use async_trait::async_trait;

use crate::batch::HttpMethod;
use crate::error::Result;

// ============================================================================
// TRANSPORT TRAIT (ASYNC)
// ============================================================================

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and read the full response body.
    ///
    /// Non-success statuses are returned as `Ok`; only failures to reach the
    /// server or to read the body are errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

// ============================================================================
// REQUEST/RESPONSE TYPES
// ============================================================================

/// Outbound request, fully resolved
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: vec![],
            body: None,
        }
    }

    /// Set a header, replacing any existing value (case-insensitive name)
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Copy of this request authorized with `token`
    pub fn with_bearer(&self, token: &str) -> Self {
        self.clone()
            .with_header("Authorization", format!("Bearer {}", token))
    }

    /// Header value lookup (case-insensitive name)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Token from the `Authorization: Bearer` header, if any
    pub fn bearer_token(&self) -> Option<&str> {
        self.header("Authorization")?.strip_prefix("Bearer ")
    }
}

/// Response with the body already read as text
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 OK with the given body
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ============================================================================
// TESTS
// ============================================================================
