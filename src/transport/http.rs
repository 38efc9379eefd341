//! HTTP transport using `reqwest`
//!
//! One shared client (connection pooling) with the crate-wide timeouts.

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{HttpRequest, HttpResponse, Transport};
use crate::batch::HttpMethod;
use crate::error::{GscError, Result};
use crate::util::{CONNECT_TIMEOUT, FETCH_TIMEOUT, REDIRECT_LIMIT, USER_AGENT};

/// `reqwest` client with the crate timeouts, redirect limit and user agent.
///
/// Used for the API and for the OAuth token endpoint.
pub(crate) fn build_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(REDIRECT_LIMIT))
        .user_agent(USER_AGENT)
        .build()?)
}

/// Transport that sends requests over the network
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();

        // Error bodies are never parsed, so a failed read must not hide the status
        let body = if response.status().is_success() {
            response.text().await.map_err(|e| GscError::Decode {
                details: format!("Failed to read response body: {}", e),
            })?
        } else {
            response.text().await.unwrap_or_else(|e| {
                debug!(status, error = %e, "Ignoring unreadable error body");
                String::new()
            })
        };

        debug!(status, body_len = body.len(), "Received response");

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one raw HTTP response per connection, then hang up
    async fn raw_server(responses: Vec<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for raw in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = vec![0u8; 16 * 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(raw.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}", addr)
    }

    // Declares 100 bytes, sends 5, closes
    const TRUNCATED_401: &str =
        "HTTP/1.1 401 Unauthorized\r\nContent-Length: 100\r\nConnection: close\r\n\r\nshort";
    const TRUNCATED_200: &str =
        "HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\n{\"a\"";

    #[tokio::test]
    async fn test_unreadable_error_body_keeps_status() {
        let base = raw_server(vec![TRUNCATED_401]).await;
        let transport = HttpTransport::new().unwrap();

        let response = transport
            .send(HttpRequest::new(HttpMethod::Get, format!("{}/x", base)))
            .await
            .unwrap();

        assert_eq!(response.status, 401);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_unreadable_success_body_is_decode_error() {
        let base = raw_server(vec![TRUNCATED_200]).await;
        let transport = HttpTransport::new().unwrap();

        let err = transport
            .send(HttpRequest::new(HttpMethod::Get, format!("{}/x", base)))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "GSC-020");
    }

    #[tokio::test]
    async fn test_unreadable_401_still_refreshes_and_retries() {
        use crate::auth::{Credential, TokenRecord, TokenRefresher};
        use crate::client::{ApiClient, CallOptions};
        use serde_json::Value;
        use std::sync::Arc;

        struct Fresh;

        #[async_trait]
        impl TokenRefresher for Fresh {
            async fn refresh(&self) -> Option<TokenRecord> {
                Some(TokenRecord::new("fresh"))
            }
        }

        let base = raw_server(vec![
            TRUNCATED_401,
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 11\r\nConnection: close\r\n\r\n{\"ok\":true}",
        ])
        .await;
        let client = ApiClient::new(Credential::new("stale"), Arc::new(Fresh))
            .unwrap()
            .with_base_url(base);

        let value: Option<Value> = client.api_call("/x", CallOptions::get()).await.unwrap();

        assert_eq!(value, Some(serde_json::json!({"ok": true})));
    }
}
