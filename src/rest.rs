// SPDX-License-Identifier: MIT

//! Plain REST/JSON client for the Kvi HTTP API (`/api/v1/...`).
//!
//! This surface is independent of the typed gRPC surface and carries
//! untyped JSON directly — the [`Value`](crate::value::Value) codec does not
//! apply here; record data passes through as [`serde_json::Value`]. Use it
//! when gRPC is unavailable or when a lightweight, schemaless integration
//! is enough.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::require_non_empty;
use crate::error::{KviError, Result};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Authentication method for the REST surface.
#[derive(Debug, Clone)]
pub enum Auth {
    /// No authentication (local development, trusted networks).
    None,
    /// API key passed via the `X-API-Key` header.
    ApiKey(String),
    /// Bearer token passed via the `Authorization: Bearer <token>` header.
    Bearer(String),
}

// ---------------------------------------------------------------------------
// RestClient
// ---------------------------------------------------------------------------

/// Client for the Kvi plain JSON HTTP API.
///
/// # Examples
///
/// ```rust,no_run
/// use kvi_client::rest::RestClient;
///
/// # #[tokio::main]
/// # async fn main() -> kvi_client::Result<()> {
/// let client = RestClient::new("http://localhost:8080")?;
/// client.put("user1", &serde_json::json!({"name": "Alice"})).await?;
/// let record = client.get("user1").await?;
/// # Ok(())
/// # }
/// ```
pub struct RestClient {
    /// Parsed base URL of the Kvi HTTP API (e.g. `http://localhost:8080`).
    base_url: Url,
    /// Underlying `reqwest` client (connection-pooled, TLS-capable).
    http: reqwest::Client,
    /// Authentication credentials.
    auth: Auth,
}

/// Standard error body from the HTTP API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct PutBody<'a> {
    key: &'a str,
    data: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    query: &'a str,
}

#[derive(Debug, Serialize)]
struct PublishBody<'a> {
    channel: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct PublishReply {
    #[serde(default)]
    receivers: u64,
}

impl RestClient {
    // -- Constructors -------------------------------------------------------

    /// Create an unauthenticated client pointing at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::build(base_url, Auth::None)
    }

    /// Create a client that authenticates via an API key header.
    pub fn with_api_key(base_url: &str, key: &str) -> Result<Self> {
        Self::build(base_url, Auth::ApiKey(key.to_owned()))
    }

    /// Create a client that authenticates via a bearer token.
    pub fn with_bearer(base_url: &str, token: &str) -> Result<Self> {
        Self::build(base_url, Auth::Bearer(token.to_owned()))
    }

    fn build(base_url: &str, auth: Auth) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| KviError::Validation(format!("invalid base URL: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(KviError::Network)?;

        Ok(RestClient {
            base_url,
            http,
            auth,
        })
    }

    // -- Operations ---------------------------------------------------------

    /// Store a record. Returns `true` when the server created it (201).
    pub async fn put(&self, key: &str, data: &serde_json::Value) -> Result<bool> {
        require_non_empty(key, "key")?;
        tracing::debug!(key, "rest put");

        let url = self.url("/api/v1/put");
        let response = self
            .apply_auth(self.http.post(url))
            .json(&PutBody { key, data })
            .send()
            .await
            .map_err(KviError::Network)?;

        if response.status().is_success() {
            Ok(response.status() == reqwest::StatusCode::CREATED)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Retrieve a record as raw JSON. A 404 decodes to `Ok(None)`.
    pub async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        require_non_empty(key, "key")?;
        tracing::debug!(key, "rest get");

        let url = self.url("/api/v1/get");
        let response = self
            .apply_auth(self.http.get(url).query(&[("key", key)]))
            .send()
            .await
            .map_err(KviError::Network)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.handle_response(response).await.map(Some)
    }

    /// Delete a record by key.
    pub async fn delete(&self, key: &str) -> Result<()> {
        require_non_empty(key, "key")?;
        tracing::debug!(key, "rest delete");

        let url = self.url("/api/v1/delete");
        let response = self
            .apply_auth(self.http.delete(url).query(&[("key", key)]))
            .send()
            .await
            .map_err(KviError::Network)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Execute a SQL-like query, returning the raw JSON result. A failed
    /// query surfaces the server's error text via [`KviError::Server`].
    pub async fn query(&self, query: &str) -> Result<serde_json::Value> {
        require_non_empty(query, "query")?;
        tracing::debug!(query, "rest query");

        let url = self.url("/api/v1/query");
        let response = self
            .apply_auth(self.http.post(url))
            .json(&QueryBody { query })
            .send()
            .await
            .map_err(KviError::Network)?;

        self.handle_response(response).await
    }

    /// Publish a message to a pub/sub channel. Returns the number of
    /// subscribers the server fanned the message out to.
    pub async fn publish(&self, channel: &str, message: &str) -> Result<u64> {
        require_non_empty(channel, "channel")?;
        tracing::debug!(channel, "rest publish");

        let url = self.url("/api/v1/pub");
        let response = self
            .apply_auth(self.http.post(url))
            .json(&PublishBody { channel, message })
            .send()
            .await
            .map_err(KviError::Network)?;

        let reply: PublishReply = self.handle_response(response).await?;
        Ok(reply.receivers)
    }

    /// Fetch server statistics as raw JSON.
    pub async fn stats(&self) -> Result<serde_json::Value> {
        let url = self.url("/api/v1/stats");
        let response = self
            .apply_auth(self.http.get(url))
            .send()
            .await
            .map_err(KviError::Network)?;
        self.handle_response(response).await
    }

    /// Ping the health endpoint. `true` when the server reports healthy.
    pub async fn health(&self) -> Result<bool> {
        let url = self.url("/health");
        let response = self
            .apply_auth(self.http.get(url))
            .send()
            .await
            .map_err(KviError::Network)?;
        Ok(response.status().is_success())
    }

    // -- Internal helpers ---------------------------------------------------

    /// Build a full URL by joining `path` onto the base URL.
    fn url(&self, path: &str) -> Url {
        // Unwrap is safe: path is always a well-formed relative segment.
        self.base_url.join(path).expect("valid path join")
    }

    /// Attach authentication headers to an outgoing request builder.
    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::None => builder,
            Auth::ApiKey(key) => builder.header("X-API-Key", key.as_str()),
            Auth::Bearer(token) => builder.bearer_auth(token),
        }
    }

    /// Deserialize a successful response or extract an error from the body.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            let body = response.text().await.map_err(KviError::Network)?;
            serde_json::from_str(&body).map_err(KviError::Serialization)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Turn a non-2xx response into the appropriate [`KviError`] variant.
    async fn extract_error(&self, response: reqwest::Response) -> KviError {
        let status = response.status().as_u16();

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("HTTP {status}"),
        };

        match status {
            404 => KviError::NotFound(message),
            _ => KviError::Server { status, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_must_parse() {
        assert!(RestClient::new("http://localhost:8080").is_ok());
        assert!(matches!(
            RestClient::new("not a url"),
            Err(KviError::Validation(_))
        ));
    }

    #[test]
    fn paths_join_onto_the_base() {
        let client = RestClient::new("http://localhost:8080").unwrap();
        assert_eq!(
            client.url("/api/v1/get").as_str(),
            "http://localhost:8080/api/v1/get"
        );
    }

    #[test]
    fn empty_key_fails_before_any_request() {
        let client = RestClient::new("http://localhost:8080").unwrap();
        let err = tokio_test::block_on(client.get("")).unwrap_err();
        assert!(matches!(err, KviError::Validation(_)));
    }
}
