// SPDX-License-Identifier: MIT

//! Administrative operations: `stats`, `health`, `snapshot`, `restore`.

use crate::client::KviClient;
use crate::error::Result;
use crate::proto;
use crate::types::{Health, Snapshot, Stats};

impl KviClient {
    /// Fetch database statistics.
    pub async fn stats(&self) -> Result<Stats> {
        let request = self.request(proto::StatsRequest {});
        let response = self.rpc().stats(request).await?.into_inner();
        Ok(Stats::from(response))
    }

    /// Check server health.
    pub async fn health(&self) -> Result<Health> {
        let request = self.request(proto::HealthRequest {});
        let response = self.rpc().health(request).await?.into_inner();
        Ok(Health::from(response))
    }

    /// Take a snapshot of the database. The returned bytes are opaque and
    /// only meaningful to [`restore`](KviClient::restore).
    pub async fn snapshot(&self) -> Result<Snapshot> {
        tracing::debug!("snapshot");
        let request = self.request(proto::SnapshotRequest {});
        let response = self.rpc().snapshot(request).await?.into_inner();
        Ok(Snapshot::from(response))
    }

    /// Restore the database from a previously taken snapshot.
    pub async fn restore(&self, snapshot: &Snapshot) -> Result<bool> {
        tracing::debug!(bytes = snapshot.data.len(), "restore");
        let request = self.request(proto::RestoreRequest {
            snapshot_data: snapshot.data.clone(),
            checksum: snapshot.checksum,
        });
        let response = self.rpc().restore(request).await?.into_inner();
        Ok(response.success)
    }
}
