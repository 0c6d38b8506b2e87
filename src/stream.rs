// SPDX-License-Identifier: MIT

//! Pull-based wrappers over the server-streaming operations.
//!
//! `scan` yields a [`RecordStream`]; `subscribe` yields a [`Subscription`].
//! Both are lazy: the calling task suspends only while awaiting the next
//! element, and the server pushes elements until it closes the stream.
//!
//! Cancellation is caller-driven and must release transport resources on
//! every exit path. Dropping a wrapper cancels the underlying RPC (tonic
//! tears the call down when the stream handle drops); [`RecordStream::close`]
//! and [`Subscription::close`] drop the handle eagerly for callers who want
//! the cancellation point to be explicit. A stream that ends without an
//! error is a normal terminal state, not a failure.
//!
//! The wrappers are generic over the element source so the lifecycle is
//! independent of the transport; production code always instantiates them
//! with [`tonic::codec::Streaming`].

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tonic::codec::Streaming;

use crate::error::Result;
use crate::proto;
use crate::types::{PubSubMessage, Record};

/// Lifecycle of a streaming call.
///
/// `Connecting` until the first element arrives, `Streaming` while elements
/// flow, `Closed` after server end-of-stream, a status error, or an explicit
/// [`close`](RecordStream::close).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// The call is established but nothing has been delivered yet.
    Connecting,
    /// At least one element has been delivered.
    Streaming,
    /// The stream is finished; no further delivery will happen.
    Closed,
}

// ---------------------------------------------------------------------------
// RecordStream (scan)
// ---------------------------------------------------------------------------

/// An ordered stream of [`Record`]s produced by `scan`.
#[derive(Debug)]
pub struct RecordStream<S = Streaming<proto::Record>> {
    inner: Option<S>,
    state: StreamState,
}

impl<S> RecordStream<S>
where
    S: Stream<Item = std::result::Result<proto::Record, tonic::Status>> + Unpin,
{
    pub(crate) fn new(inner: S) -> Self {
        RecordStream {
            inner: Some(inner),
            state: StreamState::Connecting,
        }
    }

    /// Pull the next record. `Ok(None)` means the server closed the stream.
    pub async fn next(&mut self) -> Result<Option<Record>> {
        let Some(stream) = self.inner.as_mut() else {
            return Ok(None);
        };
        match stream.next().await {
            Some(Ok(record)) => {
                self.state = StreamState::Streaming;
                Ok(Some(Record::from(record)))
            }
            None => {
                self.close();
                Ok(None)
            }
            Some(Err(status)) => {
                self.close();
                Err(status.into())
            }
        }
    }

    /// Drain the stream into a vector.
    pub async fn collect(mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await? {
            records.push(record);
        }
        Ok(records)
    }

    /// Cancel the call and release the transport resources now.
    pub fn close(&mut self) {
        self.inner = None;
        self.state = StreamState::Closed;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }
}

impl<S> Stream for RecordStream<S>
where
    S: Stream<Item = std::result::Result<proto::Record, tonic::Status>> + Unpin,
{
    type Item = Result<Record>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(stream) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };
        match Pin::new(stream).poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(record))) => {
                this.state = StreamState::Streaming;
                Poll::Ready(Some(Ok(Record::from(record))))
            }
            Poll::Ready(Some(Err(status))) => {
                this.close();
                Poll::Ready(Some(Err(status.into())))
            }
            Poll::Ready(None) => {
                this.close();
                Poll::Ready(None)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Subscription (subscribe)
// ---------------------------------------------------------------------------

/// An unbounded stream of [`PubSubMessage`]s from a channel subscription.
#[derive(Debug)]
pub struct Subscription<S = Streaming<proto::Message>> {
    inner: Option<S>,
    state: StreamState,
    channel: String,
}

impl<S> Subscription<S>
where
    S: Stream<Item = std::result::Result<proto::Message, tonic::Status>> + Unpin,
{
    pub(crate) fn new(inner: S, channel: String) -> Self {
        Subscription {
            inner: Some(inner),
            state: StreamState::Connecting,
            channel,
        }
    }

    /// The channel this subscription listens on.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Pull the next message, waiting until the server pushes one or closes
    /// the stream. `Ok(None)` means the subscription ended normally.
    pub async fn next(&mut self) -> Result<Option<PubSubMessage>> {
        let Some(stream) = self.inner.as_mut() else {
            return Ok(None);
        };
        match stream.next().await {
            Some(Ok(message)) => {
                self.state = StreamState::Streaming;
                Ok(Some(PubSubMessage::from(message)))
            }
            None => {
                self.close();
                Ok(None)
            }
            Some(Err(status)) => {
                self.close();
                Err(status.into())
            }
        }
    }

    /// Unsubscribe: cancel the call and release the transport resources now.
    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            tracing::debug!(channel = %self.channel, "subscription closed");
        }
        self.state = StreamState::Closed;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }
}

impl<S> Stream for Subscription<S>
where
    S: Stream<Item = std::result::Result<proto::Message, tonic::Status>> + Unpin,
{
    type Item = Result<PubSubMessage>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(stream) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };
        match Pin::new(stream).poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(message))) => {
                this.state = StreamState::Streaming;
                Poll::Ready(Some(Ok(PubSubMessage::from(message))))
            }
            Poll::Ready(Some(Err(status))) => {
                this.close();
                Poll::Ready(Some(Err(status.into())))
            }
            Poll::Ready(None) => {
                this.close();
                Poll::Ready(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;
    use tonic::Status;

    use super::*;
    use crate::error::KviError;

    fn record(id: &str) -> proto::Record {
        proto::Record {
            id: id.to_owned(),
            ..Default::default()
        }
    }

    fn message(id: &str) -> proto::Message {
        proto::Message {
            id: id.to_owned(),
            channel: "events".to_owned(),
            ..Default::default()
        }
    }

    fn record_stream(
        items: Vec<std::result::Result<proto::Record, Status>>,
    ) -> RecordStream<impl Stream<Item = std::result::Result<proto::Record, Status>> + Unpin>
    {
        RecordStream::new(stream::iter(items))
    }

    #[test]
    fn end_of_stream_yields_none_and_closes() {
        tokio_test::block_on(async {
            let mut records = record_stream(vec![Ok(record("a"))]);
            assert_eq!(records.state(), StreamState::Connecting);

            let first = records.next().await.unwrap().unwrap();
            assert_eq!(first.id, "a");
            assert_eq!(records.state(), StreamState::Streaming);

            assert!(records.next().await.unwrap().is_none());
            assert_eq!(records.state(), StreamState::Closed);
        });
    }

    #[test]
    fn status_error_closes_the_stream() {
        tokio_test::block_on(async {
            let mut records =
                record_stream(vec![Ok(record("a")), Err(Status::internal("boom"))]);

            assert!(records.next().await.unwrap().is_some());
            let err = records.next().await.unwrap_err();
            assert!(matches!(err, KviError::Status(_)));
            assert_eq!(records.state(), StreamState::Closed);

            // Terminal: the dropped handle delivers nothing further.
            assert!(records.next().await.unwrap().is_none());
        });
    }

    #[test]
    fn next_after_close_yields_none() {
        tokio_test::block_on(async {
            let mut records = record_stream(vec![Ok(record("a")), Ok(record("b"))]);
            records.close();
            assert_eq!(records.state(), StreamState::Closed);
            assert!(records.next().await.unwrap().is_none());
        });
    }

    #[test]
    fn collect_drains_in_order() {
        tokio_test::block_on(async {
            let records =
                record_stream(vec![Ok(record("a")), Ok(record("b")), Ok(record("c"))]);
            let all = records.collect().await.unwrap();
            let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
            assert_eq!(ids, ["a", "b", "c"]);
        });
    }

    #[test]
    fn collect_stops_at_the_first_error() {
        tokio_test::block_on(async {
            let records = record_stream(vec![Ok(record("a")), Err(Status::internal("boom"))]);
            assert!(records.collect().await.is_err());
        });
    }

    #[test]
    fn stream_impl_mirrors_the_pull_interface() {
        use futures::TryStreamExt;

        tokio_test::block_on(async {
            let records =
                record_stream(vec![Ok(record("a")), Ok(record("b"))]);
            let all: Vec<Record> = records.try_collect().await.unwrap();
            assert_eq!(all.len(), 2);

            let failing = record_stream(vec![Err(Status::unavailable("gone"))]);
            let err = failing.try_collect::<Vec<Record>>().await.unwrap_err();
            assert!(matches!(err, KviError::Status(_)));
        });
    }

    #[test]
    fn subscription_follows_the_same_lifecycle() {
        tokio_test::block_on(async {
            let mut sub = Subscription::new(
                stream::iter(vec![Ok(message("m1")), Ok(message("m2"))]),
                "events".to_owned(),
            );
            assert_eq!(sub.channel(), "events");
            assert_eq!(sub.state(), StreamState::Connecting);

            assert_eq!(sub.next().await.unwrap().unwrap().id, "m1");
            assert_eq!(sub.state(), StreamState::Streaming);

            assert_eq!(sub.next().await.unwrap().unwrap().id, "m2");
            assert!(sub.next().await.unwrap().is_none());
            assert_eq!(sub.state(), StreamState::Closed);
        });
    }

    #[test]
    fn subscription_error_and_explicit_close_are_terminal() {
        tokio_test::block_on(async {
            let mut failing = Subscription::new(
                stream::iter(vec![Err(Status::cancelled("server going away"))]),
                "events".to_owned(),
            );
            assert!(failing.next().await.is_err());
            assert_eq!(failing.state(), StreamState::Closed);
            assert!(failing.next().await.unwrap().is_none());

            let mut closed = Subscription::new(
                stream::iter(vec![Ok(message("m1"))]),
                "events".to_owned(),
            );
            closed.close();
            assert_eq!(closed.state(), StreamState::Closed);
            assert!(closed.next().await.unwrap().is_none());
        });
    }
}
