// SPDX-License-Identifier: MIT

//! Core data types for the Kvi client SDK.
//!
//! [`Record`] is the keyed entity the database stores: a [`Value`] field map
//! plus an optional similarity vector and server-assigned metadata
//! (version, TTL, checksum, timestamps). [`VectorResult`], [`PubSubMessage`],
//! [`Stats`], [`Health`], and [`Snapshot`] mirror the remaining response
//! shapes. All of them are plain value types — immutable after construction,
//! no identity beyond their fields — and convert to/from the wire messages
//! via `From`.
//!
//! On the wire every instant is Unix epoch seconds and `0` is the "absent"
//! sentinel, never a real timestamp. The conversions here apply that rule in
//! both directions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::proto;
use crate::value::{self, Value};

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A database record: a field map with versioning, TTL, and integrity
/// metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// Primary key. Non-empty.
    pub id: String,
    /// Typed field map.
    pub data: HashMap<String, Value>,
    /// Optional similarity vector. The wire encodes absence as an empty
    /// sequence, so an empty vector and a missing one are indistinguishable
    /// after a round trip; both decode to `None`.
    pub vector: Option<Vec<f32>>,
    /// Server-assigned monotonic version. 0 before the first visible write.
    pub version: u64,
    /// Absolute expiry instant. `None` means no expiry.
    pub ttl: Option<DateTime<Utc>>,
    /// Server-computed CRC32 over the record bytes. Informational only; the
    /// SDK never verifies it.
    pub checksum: u32,
    /// Creation instant, if the server tracks it.
    pub created_at: Option<DateTime<Utc>>,
    /// Last-update instant, if the server tracks it.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Build a record with just a key and data; the server fills in the rest.
    pub fn new(id: impl Into<String>, data: HashMap<String, Value>) -> Self {
        Record {
            id: id.into(),
            data,
            ..Record::default()
        }
    }
}

impl From<proto::Record> for Record {
    fn from(wire: proto::Record) -> Record {
        Record {
            id: wire.id,
            data: value::map_from_wire(wire.data),
            vector: if wire.vector.is_empty() {
                None
            } else {
                Some(wire.vector)
            },
            version: wire.version,
            ttl: instant_from_epoch(wire.ttl),
            checksum: wire.checksum,
            created_at: instant_from_epoch(wire.created_at),
            updated_at: instant_from_epoch(wire.updated_at),
        }
    }
}

impl From<Record> for proto::Record {
    fn from(record: Record) -> proto::Record {
        proto::Record {
            id: record.id,
            data: value::map_to_wire(&record.data),
            vector: record.vector.unwrap_or_default(),
            version: record.version,
            ttl: epoch_from_instant(record.ttl),
            checksum: record.checksum,
            created_at: epoch_from_instant(record.created_at),
            updated_at: epoch_from_instant(record.updated_at),
        }
    }
}

// ---------------------------------------------------------------------------
// VectorResult
// ---------------------------------------------------------------------------

/// A single similarity search hit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VectorResult {
    /// Identifier of the matched record.
    pub id: String,
    /// Similarity score. The server does not contract an ordering direction;
    /// results are delivered in server order.
    pub score: f32,
    /// The matched record, when the server chooses to hydrate it.
    pub record: Option<Record>,
}

impl From<proto::VectorResult> for VectorResult {
    fn from(wire: proto::VectorResult) -> VectorResult {
        VectorResult {
            id: wire.id,
            score: wire.score,
            record: wire.record.map(Record::from),
        }
    }
}

// ---------------------------------------------------------------------------
// PubSubMessage
// ---------------------------------------------------------------------------

/// A message delivered on a pub/sub subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct PubSubMessage {
    /// Server-assigned message identifier.
    pub id: String,
    /// Channel the message was published on.
    pub channel: String,
    /// Opaque payload bytes.
    pub data: Vec<u8>,
    /// Publish instant.
    pub timestamp: DateTime<Utc>,
}

impl From<proto::Message> for PubSubMessage {
    fn from(wire: proto::Message) -> PubSubMessage {
        PubSubMessage {
            id: wire.id,
            channel: wire.channel,
            data: wire.data,
            timestamp: DateTime::from_timestamp(wire.timestamp, 0)
                .unwrap_or(DateTime::UNIX_EPOCH),
        }
    }
}

// ---------------------------------------------------------------------------
// Stats / Health
// ---------------------------------------------------------------------------

/// Server statistics snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Total records stored.
    pub records_total: i64,
    /// Bytes of memory in use.
    pub memory_used: i64,
    /// Bytes of disk in use.
    pub disk_used: i64,
    /// Cache hit ratio in `[0, 1]`.
    pub cache_hit_ratio: f64,
    /// Average query latency in nanoseconds.
    pub avg_query_time_ns: i64,
    /// Write-ahead-log size in bytes.
    pub wal_size: i64,
    /// Engine mode (e.g. "memory", "disk", "hybrid").
    pub mode: String,
    /// Server version string.
    pub version: String,
}

impl From<proto::StatsResponse> for Stats {
    fn from(wire: proto::StatsResponse) -> Stats {
        Stats {
            records_total: wire.records_total,
            memory_used: wire.memory_used,
            disk_used: wire.disk_used,
            cache_hit_ratio: wire.cache_hit_ratio,
            avg_query_time_ns: wire.avg_query_time_ns,
            wal_size: wire.wal_size,
            mode: wire.mode,
            version: wire.version,
        }
    }
}

/// Server health report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    /// Status string (e.g. "healthy").
    pub status: String,
    /// Server-side report instant.
    pub timestamp: DateTime<Utc>,
    /// Engine mode.
    pub mode: String,
}

impl From<proto::HealthResponse> for Health {
    fn from(wire: proto::HealthResponse) -> Health {
        Health {
            status: wire.status,
            timestamp: DateTime::from_timestamp(wire.timestamp, 0)
                .unwrap_or(DateTime::UNIX_EPOCH),
            mode: wire.mode,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// An opaque database snapshot, suitable for passing back to `restore`.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Serialized snapshot bytes.
    pub data: Vec<u8>,
    /// Server-computed checksum over the snapshot.
    pub checksum: u32,
    /// When the snapshot was taken.
    pub created_at: Option<DateTime<Utc>>,
}

impl From<proto::SnapshotResponse> for Snapshot {
    fn from(wire: proto::SnapshotResponse) -> Snapshot {
        Snapshot {
            data: wire.snapshot_data,
            checksum: wire.checksum,
            created_at: instant_from_epoch(wire.created_at),
        }
    }
}

// ---------------------------------------------------------------------------
// Epoch-seconds helpers
// ---------------------------------------------------------------------------

pub(crate) fn instant_from_epoch(secs: i64) -> Option<DateTime<Utc>> {
    if secs > 0 {
        DateTime::from_timestamp(secs, 0)
    } else {
        None
    }
}

pub(crate) fn epoch_from_instant(instant: Option<DateTime<Utc>>) -> i64 {
    instant.map(|t| t.timestamp()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_wire_instants_decode_as_absent() {
        let wire = proto::Record {
            id: "k".into(),
            ..Default::default()
        };
        let record = Record::from(wire);
        assert_eq!(record.ttl, None);
        assert_eq!(record.created_at, None);
        assert_eq!(record.updated_at, None);
    }

    #[test]
    fn positive_ttl_decodes_to_the_instant() {
        let wire = proto::Record {
            id: "k".into(),
            ttl: 1_700_000_060,
            ..Default::default()
        };
        let record = Record::from(wire);
        assert_eq!(record.ttl.map(|t| t.timestamp()), Some(1_700_000_060));
    }

    #[test]
    fn empty_wire_vector_decodes_as_none() {
        let wire = proto::Record {
            id: "k".into(),
            vector: vec![],
            ..Default::default()
        };
        assert_eq!(Record::from(wire).vector, None);

        let wire = proto::Record {
            id: "k".into(),
            vector: vec![0.1, 0.2],
            ..Default::default()
        };
        assert_eq!(Record::from(wire).vector, Some(vec![0.1, 0.2]));
    }

    #[test]
    fn record_roundtrips_through_the_wire() {
        let mut data = HashMap::new();
        data.insert("a".to_owned(), Value::Int(1));
        data.insert("b".to_owned(), Value::from("two"));

        let record = Record {
            id: "key-1".into(),
            data,
            vector: Some(vec![1.0, 2.0, 3.0]),
            version: 4,
            ttl: DateTime::from_timestamp(1_700_000_000, 0),
            checksum: 0xdead_beef,
            created_at: DateTime::from_timestamp(1_600_000_000, 0),
            updated_at: DateTime::from_timestamp(1_650_000_000, 0),
        };

        let back = Record::from(proto::Record::from(record.clone()));
        assert_eq!(back, record);
    }

    #[test]
    fn absent_instants_encode_as_zero() {
        let record = Record::new("k", HashMap::new());
        let wire = proto::Record::from(record);
        assert_eq!(wire.ttl, 0);
        assert_eq!(wire.created_at, 0);
        assert_eq!(wire.updated_at, 0);
        assert!(wire.vector.is_empty());
    }

    #[test]
    fn message_epoch_converts_to_instant() {
        let wire = proto::Message {
            id: "m1".into(),
            channel: "events".into(),
            data: b"payload".to_vec(),
            timestamp: 1_700_000_000,
        };
        let msg = PubSubMessage::from(wire);
        assert_eq!(msg.timestamp.timestamp(), 1_700_000_000);
        assert_eq!(msg.data, b"payload");
    }

    #[test]
    fn vector_result_carries_hydrated_record() {
        let wire = proto::VectorResult {
            id: "doc-1".into(),
            score: 0.87,
            record: Some(proto::Record {
                id: "doc-1".into(),
                ..Default::default()
            }),
        };
        let result = VectorResult::from(wire);
        assert_eq!(result.record.as_ref().map(|r| r.id.as_str()), Some("doc-1"));
        assert_eq!(result.id, "doc-1");
    }
}
