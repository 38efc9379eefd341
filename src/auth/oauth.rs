//! OAuth `refresh_token` grant
//!
//! Exchanges the refresh token in the [`TokenCache`] for a new access token,
//! persists the result, and hands it back to the API client.

use anyhow::{bail, Context};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::{TokenCache, TokenRecord, TokenRefresher};
use crate::config::GscConfig;
use crate::error::Result;
use crate::transport::build_client;
use crate::util::DEFAULT_TOKEN_URL;

/// Refresher backed by an OAuth client (id + secret) and the token cache
pub struct OAuthRefresher {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cache: TokenCache,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl OAuthRefresher {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        cache: TokenCache,
    ) -> Result<Self> {
        Ok(Self {
            http: build_client()?,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            cache,
        })
    }

    /// Override the token endpoint
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Build from config; `None` unless both client id and secret are set
    pub fn from_config(config: &GscConfig, cache: TokenCache) -> Result<Option<Self>> {
        let (Some(client_id), Some(client_secret)) = (
            config.oauth.client_id.as_deref(),
            config.oauth.client_secret.as_deref(),
        ) else {
            return Ok(None);
        };

        let refresher = Self::new(client_id, client_secret, cache)?;
        Ok(Some(match config.oauth.token_url.as_deref() {
            Some(url) => refresher.with_token_url(url),
            None => refresher,
        }))
    }

    async fn request_token(&self) -> anyhow::Result<TokenRecord> {
        let cached = self
            .cache
            .load()
            .context("Failed to read token cache")?;

        let Some(refresh_token) = cached.as_ref().and_then(|r| r.refresh_token.clone()) else {
            bail!("No refresh token in {}", self.cache.path().display());
        };

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .context("Failed to send token refresh request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("Token endpoint returned {}: {}", status, error_text);
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token endpoint response")?;

        let record = TokenRecord {
            access_token: token.access_token,
            refresh_token: token.refresh_token.or(Some(refresh_token)),
            expires_at: token
                .expires_in
                .map(|secs| chrono::Utc::now().timestamp() + secs),
        };

        self.cache
            .save(&record)
            .context("Failed to persist refreshed token")?;

        Ok(record)
    }
}

#[async_trait]
impl TokenRefresher for OAuthRefresher {
    #[instrument(skip(self), fields(token_url = %self.token_url))]
    async fn refresh(&self) -> Option<TokenRecord> {
        match self.request_token().await {
            Ok(record) => {
                info!("Access token refreshed");
                Some(record)
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Token refresh failed");
                None
            }
        }
    }
}
