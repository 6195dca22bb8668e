use std::sync::Arc;

use crate::error::BoxError;
use crate::flow::SubscriberRef;

/// Producer side of the contract.
///
/// ## Scalar publishers
/// A publisher that can compute its (at most one) value synchronously, without
/// subscribing, overrides [`Publisher::try_scalar`]. Operators use it to skip the
/// subscription machinery entirely:
///
/// - `None`: not a scalar publisher, subscribe normally (default);
/// - `Some(Ok(Some(v)))`: evaluated to exactly one value;
/// - `Some(Ok(None))`: evaluated to nothing (empty);
/// - `Some(Err(e))`: evaluation failed.
pub trait Publisher<T>: Send + Sync + 'static {
    /// Starts a new subscription delivering signals to `subscriber`.
    fn subscribe(&self, subscriber: SubscriberRef<T>);

    /// Evaluates a synchronous scalar publisher in place.
    fn try_scalar(&self) -> Option<Result<Option<T>, BoxError>> {
        None
    }
}

/// Shared handle to a publisher.
pub type PublisherRef<T> = Arc<dyn Publisher<T>>;

impl<T, P> Publisher<T> for Arc<P>
where
    P: Publisher<T> + ?Sized,
{
    fn subscribe(&self, subscriber: SubscriberRef<T>) {
        (**self).subscribe(subscriber)
    }

    fn try_scalar(&self) -> Option<Result<Option<T>, BoxError>> {
        (**self).try_scalar()
    }
}
