//! # Credentials
//!
//! - [`TokenRecord`] - persisted OAuth token (access + optional refresh token)
//! - [`Credential`] - the bearer token a client actually sends
//! - [`TokenCache`] - JSON file holding the last known [`TokenRecord`]
//! - [`TokenRefresher`] - async capability yielding a fresh token, or nothing
//!
//! A locally cached token takes precedence over one passed explicitly. That
//! choice is made once, by [`Credential::resolve`], and the resulting
//! credential is handed to [`crate::client::ApiClient`].

mod cache;
mod oauth;

pub use cache::TokenCache;
pub use oauth::OAuthRefresher;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// OAuth token as stored in the token cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) after which `access_token` is stale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl TokenRecord {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// True if `expires_at` is known and not after `now` (unix seconds)
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Effective bearer token. `Debug` output is masked.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Pick the token to send: a non-empty cached access token wins over the
    /// explicit one. Returns `None` when neither is usable.
    pub fn resolve(explicit: Option<&str>, cached: Option<&TokenRecord>) -> Option<Self> {
        cached
            .map(|record| record.access_token.as_str())
            .filter(|token| !token.is_empty())
            .or(explicit.filter(|token| !token.is_empty()))
            .map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&mask_token(&self.0, 6)).finish()
    }
}

/// Mask a token for display
///
/// Shows first N chars + asterisks, e.g. "ya29.a***"
pub fn mask_token(token: &str, visible_chars: usize) -> String {
    if token.is_empty() {
        return String::new();
    }

    let visible: String = token.chars().take(visible_chars).collect();
    format!("{}***", visible)
}

// ============================================================================
// REFRESHER TRAIT (ASYNC)
// ============================================================================

/// Yields a new token after the API rejected the current one
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// `None` means no refreshed credential is available; the caller must not retry.
    async fn refresh(&self) -> Option<TokenRecord>;
}

/// Refresher that never has a new token
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRefresh;

#[async_trait]
impl TokenRefresher for NoRefresh {
    async fn refresh(&self) -> Option<TokenRecord> {
        None
    }
}
