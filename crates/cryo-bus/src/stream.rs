//! # Event Stream
//!
//! A subscription whose handler forwards events into a channel, for
//! consumers that prefer `recv().await` or stream combinators over
//! callbacks.
//!
//! The channel is bounded by the bus's `queue_capacity`. Dispatch never
//! waits on a slow consumer: when the channel is full the event is dropped
//! for this stream and counted in [`EventStream::dropped`].

use crate::bus::EventBus;
use crate::registry::SubscriptionId;
use cryo_events::{CryoEvent, EventKind};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tracing::{trace, warn};

/// Errors from polling a stream subscription.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The subscription was removed and every queued event consumed.
    #[error("Event stream closed")]
    Closed,
}

/// Receiving end of a stream subscription.
///
/// Delivery ends once the subscription is removed with
/// [`EventBus::unsubscribe`] (or by tag) and in-flight dispatches finish;
/// after that the stream yields the remaining queued events, then `None`.
pub struct EventStream {
    id: SubscriptionId,
    receiver: mpsc::Receiver<CryoEvent>,
    dropped: Arc<AtomicU64>,
}

impl EventStream {
    /// The id to unsubscribe with.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Events discarded because the channel was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Receive the next event. `None` once the subscription is gone.
    pub async fn recv(&mut self) -> Option<CryoEvent> {
        self.receiver.recv().await
    }

    /// Receive without waiting.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` - an event was queued
    /// - `Ok(None)` - nothing queued right now
    /// - `Err(StreamError::Closed)` - the subscription is gone
    pub fn try_recv(&mut self) -> Result<Option<CryoEvent>, StreamError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(StreamError::Closed),
        }
    }
}

impl Stream for EventStream {
    type Item = CryoEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl EventBus {
    /// Subscribe to `kind` and receive its events through a stream.
    pub fn subscribe_stream<I, S>(&self, kind: EventKind, tags: I) -> EventStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let capacity = self.config().queue_capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let dropped = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&dropped);

        let id = self.subscribe(
            kind,
            move |event: &CryoEvent| match sender.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    let dropped = counter.fetch_add(1, Ordering::Relaxed) + 1;
                    warn!(kind = %event.kind(), capacity, dropped, "Stream full, event dropped");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    trace!(kind = %event.kind(), "Stream receiver dropped, event discarded");
                }
            },
            tags,
        );
        EventStream {
            id,
            receiver,
            dropped,
        }
    }
}
