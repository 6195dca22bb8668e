use std::sync::Arc;

use crate::error::FlowError;
use crate::flow::SubscriptionRef;

/// Consumer side of the contract.
///
/// Signals take `&self`: a subscriber is shared (`Arc`) between the publisher
/// delivering signals and whoever holds it for demand, so mutable state lives
/// behind atomics or locks.
pub trait Subscriber<T>: Send + Sync + 'static {
    /// First signal; hands over the subscription used for `request`/`cancel`.
    fn on_subscribe(&self, subscription: SubscriptionRef);

    /// One value, only ever within requested demand.
    fn on_next(&self, value: T);

    /// Terminal failure.
    fn on_error(&self, error: FlowError);

    /// Terminal success.
    fn on_complete(&self);
}

/// Shared handle to a subscriber.
pub type SubscriberRef<T> = Arc<dyn Subscriber<T>>;
