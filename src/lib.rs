//! gsc-batch - batched Search Console API client
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gsc_batch::{ApiClient, BatchRequestPart, Credential, NoRefresh};
//! use serde_json::{json, Value};
//!
//! # async fn run() -> gsc_batch::Result<()> {
//! let client = ApiClient::new(Credential::new("ya29.token"), Arc::new(NoRefresh))?;
//! let parts = vec![BatchRequestPart::post(
//!     "/v1/urlInspection/index:inspect",
//!     json!({"inspectionUrl": "https://example.com/", "siteUrl": "https://example.com/"}),
//! )];
//! let entries = client.batch_api_call::<Value>(&parts).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod batch;
pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod report;
pub mod transport;
pub mod util;

pub use auth::{Credential, NoRefresh, OAuthRefresher, TokenCache, TokenRecord, TokenRefresher};
pub use batch::{BatchRequestPart, BatchResultEntry, HttpMethod, BATCH_LIMIT};
pub use client::{ApiClient, CallOptions};
pub use config::GscConfig;
pub use console::SearchConsole;
pub use error::{FixSuggestion, GscError, Result};
pub use report::{date_range, map_queries, QueryShare, SearchAnalyticsQuery};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, MockTransport, Transport};
