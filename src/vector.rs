// SPDX-License-Identifier: MIT

//! Vector index operations: `vector_add`, `vector_search`.

use std::collections::HashMap;

use crate::client::{require_non_empty, KviClient};
use crate::error::{KviError, Result};
use crate::proto;
use crate::types::VectorResult;
use crate::value::{self, Value};

impl KviClient {
    /// Add a vector to the similarity index under `key`, with optional typed
    /// metadata stored alongside it.
    pub async fn vector_add(
        &self,
        key: &str,
        vector: Vec<f32>,
        metadata: Option<HashMap<String, Value>>,
    ) -> Result<bool> {
        require_non_empty(key, "key")?;
        if vector.is_empty() {
            return Err(KviError::Validation("vector must be non-empty".into()));
        }
        tracing::debug!(key, dimensions = vector.len(), "vector_add");

        let request = self.request(proto::VectorAddRequest {
            key: key.to_owned(),
            vector,
            metadata: metadata
                .as_ref()
                .map(value::map_to_wire)
                .unwrap_or_default(),
        });
        let response = self.rpc().vector_add(request).await?.into_inner();
        Ok(response.success)
    }

    /// Search for the `k` vectors most similar to `query`.
    ///
    /// Returns at most `k` results in server order. Each result carries a
    /// score and, when the server hydrates it, the matched record; no
    /// score-ordering direction is contracted.
    pub async fn vector_search(&self, query: Vec<f32>, k: u32) -> Result<Vec<VectorResult>> {
        if query.is_empty() {
            return Err(KviError::Validation("query vector must be non-empty".into()));
        }
        if k == 0 {
            return Err(KviError::Validation("k must be greater than zero".into()));
        }
        if k > i32::MAX as u32 {
            // The wire carries k as a signed 32-bit value.
            return Err(KviError::Validation(format!(
                "k must not exceed {}",
                i32::MAX
            )));
        }
        tracing::debug!(dimensions = query.len(), k, "vector_search");

        let request = self.request(proto::VectorSearchRequest {
            query,
            k: k as i32,
        });
        let response = self.rpc().vector_search(request).await?.into_inner();
        Ok(response
            .results
            .into_iter()
            .map(VectorResult::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ConnectOptions;

    fn offline_client() -> KviClient {
        KviClient::connect_lazy("localhost:1", ConnectOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn vector_add_rejects_empty_vector() {
        let client = offline_client();
        let err = client.vector_add("k", vec![], None).await.unwrap_err();
        assert!(matches!(err, KviError::Validation(_)));
    }

    #[tokio::test]
    async fn vector_search_rejects_zero_k() {
        let client = offline_client();
        let err = client.vector_search(vec![0.5], 0).await.unwrap_err();
        assert!(matches!(err, KviError::Validation(_)));
    }

    #[tokio::test]
    async fn vector_search_rejects_k_beyond_the_wire_range() {
        // Anything above i32::MAX would wrap negative on the wire.
        let client = offline_client();
        let err =
            client.vector_search(vec![0.5], u32::MAX).await.unwrap_err();
        assert!(matches!(err, KviError::Validation(_)));
    }

    #[tokio::test]
    async fn vector_search_rejects_empty_query() {
        let client = offline_client();
        let err = client.vector_search(vec![], 5).await.unwrap_err();
        assert!(matches!(err, KviError::Validation(_)));
    }
}
