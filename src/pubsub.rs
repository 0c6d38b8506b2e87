// SPDX-License-Identifier: MIT

//! Pub/sub operations: `publish`, `subscribe`.

use crate::client::{require_non_empty, KviClient};
use crate::error::Result;
use crate::proto;
use crate::stream::Subscription;

impl KviClient {
    /// Publish a message to a channel.
    ///
    /// Success means the server accepted and framed the message, not that
    /// any subscriber received it.
    pub async fn publish(&self, channel: &str, data: Vec<u8>) -> Result<bool> {
        require_non_empty(channel, "channel")?;
        tracing::debug!(channel, bytes = data.len(), "publish");

        let request = self.request(proto::PublishRequest {
            channel: channel.to_owned(),
            data,
        });
        let response = self.rpc().publish(request).await?.into_inner();
        Ok(response.success)
    }

    /// Subscribe to a channel under a caller-chosen subscriber id.
    ///
    /// The returned [`Subscription`] delivers messages as the server pushes
    /// them; dropping or closing it unsubscribes. The server uses
    /// `subscriber_id` to distinguish consumers on the same channel, so it
    /// must be unique per consumer.
    pub async fn subscribe(&self, channel: &str, subscriber_id: &str) -> Result<Subscription> {
        require_non_empty(channel, "channel")?;
        require_non_empty(subscriber_id, "subscriber_id")?;
        tracing::debug!(channel, subscriber_id, "subscribe");

        let request = self.request(proto::SubscribeRequest {
            channel: channel.to_owned(),
            subscriber_id: subscriber_id.to_owned(),
        });
        let streaming = self.rpc().subscribe(request).await?.into_inner();
        Ok(Subscription::new(streaming, channel.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ConnectOptions;
    use crate::error::KviError;

    fn offline_client() -> KviClient {
        KviClient::connect_lazy("localhost:1", ConnectOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn publish_rejects_empty_channel() {
        let client = offline_client();
        let err = client.publish("", b"hi".to_vec()).await.unwrap_err();
        assert!(matches!(err, KviError::Validation(_)));
    }

    #[tokio::test]
    async fn subscribe_rejects_empty_subscriber_id() {
        let client = offline_client();
        let err = client.subscribe("events", "").await.unwrap_err();
        assert!(matches!(err, KviError::Validation(_)));
    }
}
