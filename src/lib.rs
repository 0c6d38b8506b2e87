// SPDX-License-Identifier: MIT

//! # Kvi Client SDK
//!
//! A Rust client library for Kvi — a key/value and vector database with
//! pub/sub channels, SQL-like queries, and snapshotting.
//!
//! The SDK speaks two independent wire surfaces:
//!
//! - The **typed gRPC surface** ([`KviClient`]): every record field travels
//!   as a self-describing [`Value`], so structure and types survive the wire
//!   losslessly.
//! - The **plain REST surface** ([`rest::RestClient`]): schemaless JSON over
//!   HTTP, for lightweight integrations.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use kvi_client::{KviClient, Value};
//!
//! #[tokio::main]
//! async fn main() -> kvi_client::Result<()> {
//!     let client = KviClient::connect("localhost:50051").await?;
//!
//!     let mut data = HashMap::new();
//!     data.insert("name".to_owned(), Value::from("test"));
//!     data.insert("count".to_owned(), Value::Int(123));
//!
//!     let version = client.put("user:1", data, None, None).await?;
//!     let record = client.get("user:1", None).await?;
//!     println!("v{version}: {:?}", record.map(|r| r.data));
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`client`] — Connection options, authentication metadata, channel setup.
//! - [`value`] — The recursive `Value` tagged union and its wire codec.
//! - [`types`] — `Record`, `VectorResult`, and the other response shapes.
//! - [`kv`] — get / put / delete / scan / batch_put.
//! - [`vector`] — vector_add / vector_search.
//! - [`pubsub`] — publish / subscribe.
//! - [`query`] — SQL-like query execution.
//! - [`admin`] — stats / health / snapshot / restore.
//! - [`stream`] — Cancellable pull-based wrappers for the streaming calls.
//! - [`rest`] — The plain JSON HTTP client.
//! - [`proto`] — Generated wire types (committed, regenerate from
//!   `proto/kvi.proto`).
//! - [`error`] — Error types and the crate-level `Result` alias.

pub mod admin;
pub mod client;
pub mod error;
pub mod kv;
pub mod proto;
pub mod pubsub;
pub mod query;
pub mod rest;
pub mod stream;
pub mod types;
pub mod value;
pub mod vector;

pub use client::{ConnectOptions, KviClient};
pub use error::{KviError, Result};
pub use stream::{RecordStream, StreamState, Subscription};
pub use types::{Health, PubSubMessage, Record, Snapshot, Stats, VectorResult};
pub use value::Value;
