//! API client: bearer auth with a single refresh-and-retry
//!
//! Two entry points share [`ApiClient::call`]:
//!
//! - [`ApiClient::api_call`] - one JSON request, parsed body or `None`
//! - [`ApiClient::batch_api_call`] - many sub-requests, chunked into
//!   `multipart/mixed` envelopes sent concurrently to `/batch`
//!
//! ## Retry contract
//!
//! A non-success status triggers exactly one call to the [`TokenRefresher`].
//! If it yields a token the request is re-sent once with that token;
//! otherwise (or if the retry also fails) the call ends with
//! [`GscError::ApiCall`]. There is no backoff and no further retry.
//!
//! A token that made the retry succeed replaces the client's credential, so
//! later calls (and clones of the client) send it first.

use std::sync::{Arc, PoisonError, RwLock};

use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::auth::{Credential, TokenRefresher};
use crate::batch::{
    chunk_count, chunks, decode_envelope, encode_envelope, multipart_content_type,
    BatchRequestPart, BatchResultEntry, HttpMethod, BATCH_LIMIT,
};
use crate::error::{GscError, Result};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
use crate::util::DEFAULT_BASE_URL;

/// Options for a single (non-batched) call
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub method: HttpMethod,
    /// Sent as `application/json`; ignored for `GET`
    pub body: Option<Value>,
}

impl CallOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            body: Some(body),
        }
    }

    pub fn put(body: Option<Value>) -> Self {
        Self {
            method: HttpMethod::Put,
            body,
        }
    }
}

/// Search Console API client
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    refresher: Arc<dyn TokenRefresher>,
    credential: Arc<RwLock<Credential>>,
    base_url: String,
}

impl ApiClient {
    /// Client over the network transport
    pub fn new(credential: Credential, refresher: Arc<dyn TokenRefresher>) -> Result<Self> {
        Ok(Self::with_transport(
            Arc::new(HttpTransport::new()?),
            credential,
            refresher,
        ))
    }

    /// Client over any transport (tests use [`crate::transport::MockTransport`])
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        credential: Credential,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Self {
        Self {
            transport,
            refresher,
            credential: Arc::new(RwLock::new(credential)),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set the API host (trailing slash is ignored)
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = base_url.as_ref().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn current_credential(&self) -> Credential {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_credential(&self, credential: Credential) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = credential;
    }

    /// Send `request` with the client's credential, refreshing and retrying once
    /// on a non-success status.
    ///
    /// Any `Authorization` header already on `request` is replaced.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn call(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut response = self
            .transport
            .send(request.with_bearer(self.current_credential().as_str()))
            .await?;

        if !response.is_success() {
            warn!(status = response.status, "API call failed, refreshing token");

            match self.refresher.refresh().await {
                Some(token) => {
                    response = self
                        .transport
                        .send(request.with_bearer(&token.access_token))
                        .await?;

                    if response.is_success() {
                        self.store_credential(Credential::new(token.access_token));
                    }
                }
                None => debug!("No refreshed token available, not retrying"),
            }
        }

        if !response.is_success() {
            warn!(status = response.status, "API call failed");
            return Err(GscError::ApiCall);
        }

        Ok(response)
    }

    /// Single JSON call to `{base_url}{path}`.
    ///
    /// Returns `Ok(None)` when the success body is empty or not a valid `T`.
    #[instrument(skip(self, opts), fields(method = %opts.method))]
    pub async fn api_call<T: DeserializeOwned>(
        &self,
        path: &str,
        opts: CallOptions,
    ) -> Result<Option<T>> {
        let mut request = HttpRequest::new(opts.method, format!("{}{}", self.base_url, path))
            .with_header("Accept", "application/json");

        if opts.method != HttpMethod::Get {
            if let Some(body) = &opts.body {
                request = request
                    .with_header("Content-Type", "application/json")
                    .with_body(body.to_string());
            }
        }

        let response = self.call(request).await?;

        Ok(serde_json::from_str(&response.body).ok())
    }

    /// Send `parts` through the `/batch` endpoint.
    ///
    /// Parts are split into chunks of [`BATCH_LIMIT`], all chunks are sent
    /// concurrently, and the results are flattened in chunk order. Within a
    /// chunk, entries follow the order of the response parts; parts that
    /// cannot be matched or parsed are dropped.
    ///
    /// Returns `Ok(None)` for empty input without touching the network. Any
    /// chunk failure fails the whole call.
    #[instrument(skip(self, parts), fields(parts = parts.len()))]
    pub async fn batch_api_call<T: DeserializeOwned>(
        &self,
        parts: &[BatchRequestPart],
    ) -> Result<Option<Vec<BatchResultEntry<T>>>> {
        if parts.is_empty() {
            return Ok(None);
        }

        debug!(
            chunks = chunk_count(parts.len(), BATCH_LIMIT),
            "Dispatching batch chunks"
        );

        let per_chunk =
            try_join_all(chunks(parts, BATCH_LIMIT).map(|chunk| self.process_chunk(chunk)))
                .await?;

        Ok(Some(per_chunk.into_iter().flatten().collect()))
    }

    async fn process_chunk<T: DeserializeOwned>(
        &self,
        chunk: &[BatchRequestPart],
    ) -> Result<Vec<BatchResultEntry<T>>> {
        let request = HttpRequest::new(HttpMethod::Post, format!("{}/batch", self.base_url))
            .with_header("Accept", "application/json")
            .with_header("Content-Type", multipart_content_type())
            .with_body(encode_envelope(chunk));

        let response = self.call(request).await?;
        let entries = decode_envelope(&response.body, chunk);

        debug!(
            sent = chunk.len(),
            decoded = entries.len(),
            "Batch chunk decoded"
        );

        Ok(entries)
    }
}
