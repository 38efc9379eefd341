//! # Batch Envelopes
//!
//! Building blocks for the Search Console `/batch` endpoint:
//!
//! - [`chunks`] - split requests into groups of at most [`BATCH_LIMIT`]
//! - [`encode_envelope`] - render one group as a `multipart/mixed` body
//! - [`decode_envelope`] - pair the parts of a multipart response with their requests
//!
//! Correlation between a request and its response is positional: request `N`
//! of a chunk is tagged `Content-ID: <request-N>` and the API echoes
//! `Content-ID: <response-request-N>`. Indices are chunk-local.
//!
//! ```rust
//! use gsc_batch::batch::{decode_envelope, encode_envelope, BatchRequestPart};
//! use serde_json::{json, Value};
//!
//! let parts = vec![BatchRequestPart::post("/v1/a", json!({"n": 1}))];
//! let body = encode_envelope(&parts);
//! assert!(body.contains("Content-ID: <request-0>"));
//!
//! let response = "--batch_x\nContent-ID: <response-request-0>\n\n{\"ok\": true}\n--batch_x--";
//! let entries = decode_envelope::<Value>(response, &parts);
//! assert_eq!(entries.len(), 1);
//! ```

mod chunk;
mod envelope;

pub use chunk::{chunk_count, chunks};
pub use envelope::{decode_envelope, encode_envelope, multipart_content_type};

pub use crate::util::BATCH_LIMIT;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// HTTP METHOD
// ============================================================================

/// Methods accepted by the Search Console API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Put,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// REQUEST / RESULT TYPES
// ============================================================================

/// One logical sub-request inside a batch envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequestPart {
    /// API path relative to the host (e.g. `/v1/urlInspection/index:inspect`)
    pub api_path: String,
    pub method: HttpMethod,
    /// JSON body, serialized compactly into the envelope
    pub body: Value,
}

impl BatchRequestPart {
    pub fn new(method: HttpMethod, api_path: impl Into<String>, body: Value) -> Self {
        Self {
            api_path: api_path.into(),
            method,
            body,
        }
    }

    pub fn get(api_path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, api_path, Value::Null)
    }

    pub fn post(api_path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, api_path, body)
    }

    pub fn put(api_path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Put, api_path, body)
    }
}

/// A decoded response part paired with the request that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResultEntry<T = Value> {
    pub request: BatchRequestPart,
    pub response: T,
}
