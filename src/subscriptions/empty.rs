//! Subscriptions for sequences that end before any demand matters.

use crate::error::FlowError;
use crate::flow::{SubscriberRef, Subscription};
use std::sync::Arc;

/// No-op subscription handed to subscribers of an already-terminated sequence.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySubscription;

impl Subscription for EmptySubscription {
    fn request(&self, _n: u64) {}

    fn cancel(&self) {}
}

/// Signals `on_subscribe(EmptySubscription)` then `on_complete()`.
pub fn complete<T: 'static>(subscriber: &SubscriberRef<T>) {
    subscriber.on_subscribe(Arc::new(EmptySubscription));
    subscriber.on_complete();
}

/// Signals `on_subscribe(EmptySubscription)` then `on_error(error)`.
pub fn error<T: 'static>(subscriber: &SubscriberRef<T>, error: FlowError) {
    subscriber.on_subscribe(Arc::new(EmptySubscription));
    subscriber.on_error(error);
}
