use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::FlowError;
use crate::flow::{Subscriber, SubscriptionRef, UNBOUNDED};

/// One recorded signal.
#[derive(Debug)]
pub enum Signal<T> {
    Subscribe,
    Next(T),
    Error(FlowError),
    Complete,
}

impl<T> Signal<T> {
    /// Short name of the signal kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Signal::Subscribe => "subscribe",
            Signal::Next(_) => "next",
            Signal::Error(_) => "error",
            Signal::Complete => "complete",
        }
    }
}

/// Subscriber recording all signals, with demand driven by the test.
///
/// On `on_subscribe` it requests the configured initial amount (nothing when `0`).
/// The subscription is released on the first terminal signal.
pub struct TestSubscriber<T> {
    initial: u64,
    subscription: Mutex<Option<SubscriptionRef>>,
    signals: Mutex<Vec<Signal<T>>>,
}

impl<T: Send + 'static> TestSubscriber<T> {
    /// Subscriber requesting unbounded demand on subscribe.
    pub fn new() -> Arc<Self> {
        Self::with_request(UNBOUNDED)
    }

    /// Subscriber requesting `initial` on subscribe (`0` requests nothing).
    pub fn with_request(initial: u64) -> Arc<Self> {
        Arc::new(Self {
            initial,
            subscription: Mutex::new(None),
            signals: Mutex::new(Vec::new()),
        })
    }

    /// Requests `n` more values through the received subscription.
    pub fn request(&self, n: u64) {
        let s = self.subscription.lock().clone();
        if let Some(s) = s {
            s.request(n);
        }
    }

    /// Cancels the received subscription.
    pub fn cancel(&self) {
        let s = self.subscription.lock().take();
        if let Some(s) = s {
            s.cancel();
        }
    }

    /// Kinds of all recorded signals, in arrival order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.signals.lock().iter().map(Signal::kind).collect()
    }

    /// Number of `on_complete` signals.
    pub fn completions(&self) -> usize {
        self.count(|s| matches!(s, Signal::Complete))
    }

    /// Number of `on_subscribe` signals.
    pub fn subscriptions(&self) -> usize {
        self.count(|s| matches!(s, Signal::Subscribe))
    }

    /// Labels of recorded errors.
    pub fn error_labels(&self) -> Vec<&'static str> {
        self.signals
            .lock()
            .iter()
            .filter_map(|s| match s {
                Signal::Error(e) => Some(e.as_label()),
                _ => None,
            })
            .collect()
    }

    /// Applies `f` to each recorded error.
    pub fn map_errors<X>(&self, f: impl Fn(&FlowError) -> X) -> Vec<X> {
        self.signals
            .lock()
            .iter()
            .filter_map(|s| match s {
                Signal::Error(e) => Some(f(e)),
                _ => None,
            })
            .collect()
    }

    /// Returns `true` once a terminal signal was recorded.
    pub fn is_terminated(&self) -> bool {
        self.count(|s| matches!(s, Signal::Error(_) | Signal::Complete)) > 0
    }

    fn count(&self, f: impl Fn(&Signal<T>) -> bool) -> usize {
        self.signals.lock().iter().filter(|s| f(s)).count()
    }

    fn push(&self, signal: Signal<T>) {
        self.signals.lock().push(signal);
    }
}

impl<T: Clone + Send + 'static> TestSubscriber<T> {
    /// Recorded values, in arrival order.
    pub fn values(&self) -> Vec<T> {
        self.signals
            .lock()
            .iter()
            .filter_map(|s| match s {
                Signal::Next(v) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }
}

impl<T: Send + 'static> Subscriber<T> for TestSubscriber<T> {
    fn on_subscribe(&self, subscription: SubscriptionRef) {
        self.push(Signal::Subscribe);
        *self.subscription.lock() = Some(subscription.clone());
        if self.initial > 0 {
            subscription.request(self.initial);
        }
    }

    fn on_next(&self, value: T) {
        self.push(Signal::Next(value));
    }

    fn on_error(&self, error: FlowError) {
        self.push(Signal::Error(error));
        self.subscription.lock().take();
    }

    fn on_complete(&self) {
        self.push(Signal::Complete);
        self.subscription.lock().take();
    }
}
