// SPDX-License-Identifier: MIT

//! Kvi client configuration, authentication, and gRPC channel plumbing.
//!
//! [`KviClient`] is the primary entry point for the typed wire surface. It
//! owns the gRPC channel and the parsed `api-key` metadata for its whole
//! lifetime; operation methods (key/value CRUD, vector search, pub/sub,
//! queries, admin) are defined as `impl KviClient` blocks in their
//! respective modules.
//!
//! The client holds no mutable state after construction. Every call builds
//! its own request and metadata locally, so a single instance can be shared
//! freely across tasks.

use std::time::Duration;

use tonic::metadata::AsciiMetadataValue;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

use crate::error::{KviError, Result};
use crate::proto::kvi_service_client::KviServiceClient;

/// Connection options for [`KviClient`].
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Negotiate TLS using the platform's native root certificates.
    pub use_tls: bool,
    /// API key attached to every call as `api-key` metadata.
    pub api_key: Option<String>,
    /// Per-request timeout, also applied to connection establishment.
    pub timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        ConnectOptions {
            use_tls: false,
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// The main Kvi client for the structured RPC surface.
///
/// # Examples
///
/// ```rust,no_run
/// use kvi_client::KviClient;
///
/// # #[tokio::main]
/// # async fn main() -> kvi_client::Result<()> {
/// let client = KviClient::connect("localhost:50051").await?;
/// let health = client.health().await?;
/// println!("server is {}", health.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct KviClient {
    /// Stub over the shared channel. Cloned per call; clones are cheap and
    /// reuse the underlying connection.
    inner: KviServiceClient<Channel>,
    /// Pre-parsed `api-key` metadata value, if configured.
    api_key: Option<AsciiMetadataValue>,
}

impl KviClient {
    /// Connect to a Kvi server with default options.
    ///
    /// `addr` may be a bare `host:port`; a scheme is inferred from the TLS
    /// setting when none is given.
    pub async fn connect(addr: &str) -> Result<Self> {
        Self::connect_with(addr, ConnectOptions::default()).await
    }

    /// Connect with explicit options, waiting for the channel to become
    /// ready.
    pub async fn connect_with(addr: &str, options: ConnectOptions) -> Result<Self> {
        let (endpoint, api_key) = Self::prepare(addr, &options)?;
        let channel = endpoint.connect().await?;
        tracing::debug!(addr, "connected");
        Ok(Self::from_channel(channel, api_key))
    }

    /// Build a client whose channel connects on first use instead of
    /// eagerly. Useful when the server may come up after the client.
    pub fn connect_lazy(addr: &str, options: ConnectOptions) -> Result<Self> {
        let (endpoint, api_key) = Self::prepare(addr, &options)?;
        Ok(Self::from_channel(endpoint.connect_lazy(), api_key))
    }

    fn from_channel(channel: Channel, api_key: Option<AsciiMetadataValue>) -> Self {
        KviClient {
            inner: KviServiceClient::new(channel),
            api_key,
        }
    }

    /// Shared endpoint/metadata preparation for all constructors.
    fn prepare(
        addr: &str,
        options: &ConnectOptions,
    ) -> Result<(Endpoint, Option<AsciiMetadataValue>)> {
        if addr.is_empty() {
            return Err(KviError::Validation("address must be non-empty".into()));
        }

        let uri = if addr.contains("://") {
            addr.to_owned()
        } else if options.use_tls {
            format!("https://{addr}")
        } else {
            format!("http://{addr}")
        };

        let mut endpoint = Endpoint::from_shared(uri)?
            .timeout(options.timeout)
            .connect_timeout(options.timeout);

        if options.use_tls {
            endpoint = endpoint.tls_config(ClientTlsConfig::new().with_native_roots())?;
        }

        let api_key = options
            .api_key
            .as_deref()
            .map(|key| {
                AsciiMetadataValue::try_from(key).map_err(|_| {
                    KviError::Validation("api key contains non-ASCII characters".into())
                })
            })
            .transpose()?;

        Ok((endpoint, api_key))
    }

    // -- Internal per-call helpers ------------------------------------------

    /// Wrap a message in a request, attaching the `api-key` metadata when
    /// configured. Built fresh per call; nothing is shared mutably.
    pub(crate) fn request<T>(&self, message: T) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        if let Some(key) = &self.api_key {
            request.metadata_mut().insert("api-key", key.clone());
        }
        request
    }

    /// A stub for one call. Cloning shares the channel, not per-call state.
    pub(crate) fn rpc(&self) -> KviServiceClient<Channel> {
        self.inner.clone()
    }
}

/// Reject empty required string arguments before anything touches the wire.
pub(crate) fn require_non_empty(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        Err(KviError::Validation(format!("{what} must be non-empty")))
    } else {
        Ok(())
    }
}
