// SPDX-License-Identifier: MIT

//! Key/value operations: `get`, `put`, `delete`, `scan`, `batch_put`.

use std::collections::HashMap;

use chrono::Utc;

use crate::client::{require_non_empty, KviClient};
use crate::error::{KviError, Result};
use crate::proto;
use crate::stream::RecordStream;
use crate::types::Record;
use crate::value::{self, Value};

impl KviClient {
    /// Retrieve a record by key.
    ///
    /// `as_of` is an optional epoch-seconds instant for a time-travel read.
    /// A missing key is `Ok(None)`, never an error.
    pub async fn get(&self, key: &str, as_of: Option<i64>) -> Result<Option<Record>> {
        require_non_empty(key, "key")?;
        tracing::debug!(key, "get");

        let request = self.request(proto::GetRequest {
            key: key.to_owned(),
            as_of: as_of.unwrap_or(0),
        });
        let response = self.rpc().get(request).await?.into_inner();

        if !response.found {
            return Ok(None);
        }
        Ok(response.record.map(Record::from))
    }

    /// Store a record, returning its new server-assigned version.
    ///
    /// `vector` attaches a similarity vector; `ttl_seconds` sets a relative
    /// expiry which is encoded as the absolute instant `now + ttl_seconds`.
    pub async fn put(
        &self,
        key: &str,
        data: HashMap<String, Value>,
        vector: Option<Vec<f32>>,
        ttl_seconds: Option<u64>,
    ) -> Result<u64> {
        require_non_empty(key, "key")?;
        tracing::debug!(key, ttl = ?ttl_seconds, "put");

        let record = proto::Record {
            id: key.to_owned(),
            data: value::map_to_wire(&data),
            vector: vector.unwrap_or_default(),
            ttl: ttl_epoch(ttl_seconds),
            ..Default::default()
        };

        let request = self.request(proto::PutRequest {
            key: key.to_owned(),
            record: Some(record),
        });
        let response = self.rpc().put(request).await?.into_inner();
        Ok(response.version)
    }

    /// Delete a record by key. Returns whether the server acknowledged the
    /// delete (deleting an absent key still succeeds).
    pub async fn delete(&self, key: &str) -> Result<bool> {
        require_non_empty(key, "key")?;
        tracing::debug!(key, "delete");

        let request = self.request(proto::DeleteRequest {
            key: key.to_owned(),
        });
        let response = self.rpc().delete(request).await?.into_inner();
        Ok(response.success)
    }

    /// Stream records whose keys lie in `[start, end)`, up to `limit`.
    ///
    /// An empty `end` leaves the range open-ended. The returned stream is
    /// pull-based and cancellable; see [`RecordStream`].
    pub async fn scan(&self, start: &str, end: &str, limit: u32) -> Result<RecordStream> {
        if limit == 0 {
            return Err(KviError::Validation("limit must be greater than zero".into()));
        }
        if limit > i32::MAX as u32 {
            // The wire carries limit as a signed 32-bit value.
            return Err(KviError::Validation(format!(
                "limit must not exceed {}",
                i32::MAX
            )));
        }
        if !end.is_empty() && start > end {
            return Err(KviError::Validation(
                "start must not be greater than end".into(),
            ));
        }
        tracing::debug!(start, end, limit, "scan");

        let request = self.request(proto::ScanRequest {
            start: start.to_owned(),
            end: end.to_owned(),
            limit: limit as i32,
        });
        let streaming = self.rpc().scan(request).await?.into_inner();
        Ok(RecordStream::new(streaming))
    }

    /// Store multiple records in one round trip, returning how many were
    /// written. An empty entry map is a no-op that returns zero.
    pub async fn batch_put(
        &self,
        entries: HashMap<String, HashMap<String, Value>>,
    ) -> Result<usize> {
        let mut wire_entries = HashMap::with_capacity(entries.len());
        for (key, data) in &entries {
            require_non_empty(key, "key")?;
            wire_entries.insert(
                key.clone(),
                proto::Record {
                    id: key.clone(),
                    data: value::map_to_wire(data),
                    ..Default::default()
                },
            );
        }
        tracing::debug!(count = wire_entries.len(), "batch_put");

        let request = self.request(proto::BatchPutRequest {
            entries: wire_entries,
        });
        let response = self.rpc().batch_put(request).await?.into_inner();
        Ok(response.count as usize)
    }
}

/// Encode a relative TTL as the absolute epoch instant `now + ttl_seconds`.
/// 0 means "no TTL" on the wire.
fn ttl_epoch(ttl_seconds: Option<u64>) -> i64 {
    ttl_seconds
        .map(|secs| Utc::now().timestamp() + secs as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ConnectOptions;

    #[test]
    fn relative_ttl_encodes_near_now_plus_offset() {
        let now = Utc::now().timestamp();
        let ttl = ttl_epoch(Some(60));
        assert!((ttl - (now + 60)).abs() <= 1);
        assert_eq!(ttl_epoch(None), 0);
    }

    fn offline_client() -> KviClient {
        KviClient::connect_lazy("localhost:1", ConnectOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn scan_rejects_zero_limit() {
        let client = offline_client();
        let err = client.scan("a", "z", 0).await.unwrap_err();
        assert!(matches!(err, KviError::Validation(_)));
    }

    #[tokio::test]
    async fn scan_rejects_limit_beyond_the_wire_range() {
        // Anything above i32::MAX would wrap negative on the wire.
        let client = offline_client();
        let err =
            client.scan("a", "z", i32::MAX as u32 + 1).await.unwrap_err();
        assert!(matches!(err, KviError::Validation(_)));
    }

    #[tokio::test]
    async fn scan_rejects_inverted_range() {
        let client = offline_client();
        let err = client.scan("z", "a", 10).await.unwrap_err();
        assert!(matches!(err, KviError::Validation(_)));
    }

    #[tokio::test]
    async fn scan_allows_open_ended_range() {
        // An empty end is open-ended, so "z" > "" must not trip validation.
        // The lazy channel then fails at the transport, not in validation.
        let client = offline_client();
        let err = client.scan("z", "", 10).await.unwrap_err();
        assert!(!matches!(err, KviError::Validation(_)));
    }

    #[tokio::test]
    async fn put_rejects_empty_key() {
        let client = offline_client();
        let err =
            client.put("", HashMap::new(), None, None).await.unwrap_err();
        assert!(matches!(err, KviError::Validation(_)));
    }

    #[tokio::test]
    async fn batch_put_rejects_empty_keys_within_the_batch() {
        let client = offline_client();
        let mut entries = HashMap::new();
        entries.insert(String::new(), HashMap::new());
        let err = client.batch_put(entries).await.unwrap_err();
        assert!(matches!(err, KviError::Validation(_)));
    }
}
