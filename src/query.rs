// SPDX-License-Identifier: MIT

//! SQL-like query execution.

use crate::client::{require_non_empty, KviClient};
use crate::error::{KviError, Result};
use crate::proto;
use crate::types::Record;

impl KviClient {
    /// Execute a SQL-like query and return the matching records.
    ///
    /// A query the server rejects (parse error, unsupported statement, ...)
    /// becomes [`KviError::Query`] carrying the server's error text
    /// verbatim, and yields no records.
    pub async fn query(&self, query: &str) -> Result<Vec<Record>> {
        require_non_empty(query, "query")?;
        tracing::debug!(query, "query");

        let request = self.request(proto::QueryRequest {
            query: query.to_owned(),
        });
        let response = self.rpc().query(request).await?.into_inner();
        decode_query_response(response)
    }
}

/// Turn a query response into records, or the server's failure text into a
/// distinguished error.
fn decode_query_response(response: proto::QueryResponse) -> Result<Vec<Record>> {
    if !response.success {
        return Err(KviError::Query(response.error));
    }
    Ok(response.records.into_iter().map(Record::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_surfaces_the_server_text_verbatim() {
        let response = proto::QueryResponse {
            success: false,
            error: "syntax error near 'FORM'".into(),
            records: vec![proto::Record::default()],
        };
        match decode_query_response(response) {
            Err(KviError::Query(text)) => assert_eq!(text, "syntax error near 'FORM'"),
            other => panic!("expected query error, got {other:?}"),
        }
    }

    #[test]
    fn success_decodes_all_records() {
        let response = proto::QueryResponse {
            success: true,
            error: String::new(),
            records: vec![
                proto::Record {
                    id: "a".into(),
                    ..Default::default()
                },
                proto::Record {
                    id: "b".into(),
                    ..Default::default()
                },
            ],
        };
        let records = decode_query_response(response).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
