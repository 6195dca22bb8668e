use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::FlowError;
use crate::flow::{Publisher, SubscriberRef, Subscription, SubscriptionRef};

/// Subscription recording every `request` call and `cancel`.
#[derive(Debug, Default)]
pub struct TestSubscription {
    requests: Mutex<Vec<u64>>,
    cancels: AtomicUsize,
}

impl TestSubscription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amounts passed to `request`, one entry per call.
    pub fn request_calls(&self) -> Vec<u64> {
        self.requests.lock().clone()
    }

    /// Sum of all requested amounts (saturating).
    pub fn total_requested(&self) -> u64 {
        self.requests
            .lock()
            .iter()
            .fold(0u64, |acc, n| acc.saturating_add(*n))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_count() > 0
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::Acquire)
    }
}

impl Subscription for TestSubscription {
    fn request(&self, n: u64) {
        self.requests.lock().push(n);
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::AcqRel);
    }
}

struct PublisherState<T> {
    auto_subscribe: bool,
    subscribers: Mutex<Vec<SubscriberRef<T>>>,
    subscription: Arc<TestSubscription>,
}

/// Source driven by the test.
///
/// Cloning yields another handle to the same source. All subscribers share one
/// [`TestSubscription`].
pub struct TestPublisher<T> {
    state: Arc<PublisherState<T>>,
}

impl<T> Clone for TestPublisher<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Clone + Send + 'static> TestPublisher<T> {
    /// Source that signals `on_subscribe` as soon as it is subscribed.
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Source that only signals `on_subscribe` when told to
    /// ([`signal_subscribe`](Self::signal_subscribe)).
    pub fn manual() -> Self {
        Self::build(false)
    }

    fn build(auto_subscribe: bool) -> Self {
        Self {
            state: Arc::new(PublisherState {
                auto_subscribe,
                subscribers: Mutex::new(Vec::new()),
                subscription: Arc::new(TestSubscription::new()),
            }),
        }
    }

    /// Shared handle usable wherever a [`PublisherRef`](crate::PublisherRef) is expected.
    pub fn to_ref(&self) -> Arc<Self> {
        Arc::new(self.clone())
    }

    /// Signals `on_subscribe` with the shared [`TestSubscription`].
    pub fn signal_subscribe(&self) {
        let s: SubscriptionRef = self.state.subscription.clone();
        self.offer_subscription(s);
    }

    /// Signals `on_subscribe` with an arbitrary subscription.
    pub fn offer_subscription(&self, subscription: SubscriptionRef) {
        for sub in self.snapshot() {
            sub.on_subscribe(subscription.clone());
        }
    }

    pub fn next(&self, value: T) {
        for sub in self.snapshot() {
            sub.on_next(value.clone());
        }
    }

    /// Signals `on_error` with a [`FlowError::Source`] built from `message`.
    pub fn error(&self, message: &str) {
        for sub in self.snapshot() {
            sub.on_error(FlowError::upstream(message.to_string()));
        }
    }

    pub fn complete(&self) {
        for sub in self.snapshot() {
            sub.on_complete();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.subscribers.lock().len()
    }

    pub fn subscription(&self) -> Arc<TestSubscription> {
        Arc::clone(&self.state.subscription)
    }

    pub fn request_calls(&self) -> Vec<u64> {
        self.state.subscription.request_calls()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.subscription.is_cancelled()
    }

    fn snapshot(&self) -> Vec<SubscriberRef<T>> {
        self.state.subscribers.lock().clone()
    }
}

impl<T: Clone + Send + 'static> Publisher<T> for TestPublisher<T> {
    fn subscribe(&self, subscriber: SubscriberRef<T>) {
        self.state.subscribers.lock().push(subscriber.clone());
        if self.state.auto_subscribe {
            subscriber.on_subscribe(self.state.subscription.clone());
        }
    }
}
