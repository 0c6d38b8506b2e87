// SPDX-License-Identifier: MIT

//! Error types for the Kvi client SDK.
//!
//! All fallible operations in this crate return [`Result<T>`], an alias for
//! `std::result::Result<T, KviError>`. The [`KviError`] enum covers transport
//! failures on both wire surfaces, server-reported query failures, and
//! client-side validation problems.
//!
//! Two things are deliberately *not* errors:
//!
//! - A missing key: `get` returns `Ok(None)`.
//! - Encoding degradation: a host value with no representable [`Value`]
//!   variant silently becomes [`Value::Null`] (see the `value` module docs).
//!
//! [`Value`]: crate::value::Value
//! [`Value::Null`]: crate::value::Value::Null

use thiserror::Error;

/// Comprehensive error type for Kvi client operations.
///
/// Each variant carries enough context for callers to decide whether to
/// retry, surface a user-facing message, or escalate.
#[derive(Error, Debug)]
pub enum KviError {
    /// Client-side validation failed before any request was sent (empty key,
    /// zero limit, unparsable address, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The gRPC channel could not be established or broke mid-call.
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// The server answered an RPC with a non-OK gRPC status.
    #[error("RPC failed: {0}")]
    Status(#[from] tonic::Status),

    /// The server executed a query and reported failure. The message is the
    /// server's error text, verbatim.
    #[error("Query failed: {0}")]
    Query(String),

    /// The requested entity was not found (REST surface; the gRPC `get`
    /// reports absence as `Ok(None)` instead).
    #[error("Not found: {0}")]
    NotFound(String),

    /// An underlying HTTP / network transport error from `reqwest`.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed (REST surface).
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The REST server returned an HTTP error status with a message body.
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code (e.g. 500, 502, 503).
        status: u16,
        /// Human-readable error message from the server response body.
        message: String,
    },
}

/// Crate-level result alias using [`KviError`].
pub type Result<T> = std::result::Result<T, KviError>;
