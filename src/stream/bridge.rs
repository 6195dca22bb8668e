use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll, ready};

use futures::Stream;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::FlowError;
use crate::flow::{Publisher, Subscriber, SubscriptionRef};
use crate::stream::StreamConfig;

enum Notification<T> {
    Next(T),
    Error(FlowError),
    Complete,
}

/// Subscribes to `publisher` and exposes its signals as a [`Stream`].
pub fn into_stream<T, P>(publisher: P, config: StreamConfig) -> SignalStream<T>
where
    T: Send + 'static,
    P: Publisher<T>,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let subscription = Arc::new(OnceLock::new());

    publisher.subscribe(Arc::new(StreamSubscriber {
        tx,
        subscription: Arc::clone(&subscription),
        initial: config.initial_request(),
    }));

    SignalStream {
        rx,
        subscription,
        limit: config.replenish_limit(),
        consumed: 0,
        done: false,
    }
}

struct StreamSubscriber<T> {
    tx: mpsc::UnboundedSender<Notification<T>>,
    subscription: Arc<OnceLock<SubscriptionRef>>,
    initial: u64,
}

impl<T: Send + 'static> Subscriber<T> for StreamSubscriber<T> {
    fn on_subscribe(&self, subscription: SubscriptionRef) {
        if let Err(duplicate) = self.subscription.set(Arc::clone(&subscription)) {
            debug!("stream bridge received a second subscription; cancelling it");
            duplicate.cancel();
            return;
        }
        subscription.request(self.initial);
    }

    fn on_next(&self, value: T) {
        // A closed channel means the stream was dropped and has cancelled.
        let _ = self.tx.send(Notification::Next(value));
    }

    fn on_error(&self, error: FlowError) {
        let _ = self.tx.send(Notification::Error(error));
    }

    fn on_complete(&self) {
        let _ = self.tx.send(Notification::Complete);
    }
}

/// Stream of the values signalled by a publisher.
///
/// Yields `Ok(value)` per `on_next`, a final `Err` on `on_error`, and ends on
/// `on_complete`.
pub struct SignalStream<T> {
    rx: mpsc::UnboundedReceiver<Notification<T>>,
    subscription: Arc<OnceLock<SubscriptionRef>>,
    limit: Option<u64>,
    consumed: u64,
    done: bool,
}

impl<T> Unpin for SignalStream<T> {}

impl<T> SignalStream<T> {
    fn replenish(&mut self) {
        let Some(limit) = self.limit else {
            return;
        };
        self.consumed += 1;
        if self.consumed == limit {
            self.consumed = 0;
            if let Some(s) = self.subscription.get() {
                s.request(limit);
            }
        }
    }
}

impl<T> Stream for SignalStream<T> {
    type Item = Result<T, FlowError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }
        match ready!(self.rx.poll_recv(cx)) {
            Some(Notification::Next(v)) => {
                self.replenish();
                Poll::Ready(Some(Ok(v)))
            }
            Some(Notification::Error(e)) => {
                self.done = true;
                Poll::Ready(Some(Err(e)))
            }
            Some(Notification::Complete) | None => {
                self.done = true;
                Poll::Ready(None)
            }
        }
    }
}

impl<T> Drop for SignalStream<T> {
    fn drop(&mut self) {
        if !self.done {
            if let Some(s) = self.subscription.get() {
                s.cancel();
            }
        }
    }
}
