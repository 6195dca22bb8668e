//! Scalar fast path: resolve the whole flat-map without a coordinator when the
//! outer source is a synchronous scalar.

use std::fmt::Debug;
use std::sync::Arc;

use crate::flow::{PublisherRef, SubscriberRef};
use crate::hooks::Hooks;
use crate::operators::mapper::{self, Mapper};
use crate::subscriptions::{self, ScalarSubscription};

/// Returns `false` when `source` is not scalar; otherwise fully handles `actual`.
///
/// ```text
/// source.try_scalar()
///   ├─ None          → false (caller subscribes normally)
///   ├─ Err(e)        → on_subscribe(empty), on_error(operator(e))
///   ├─ Ok(None)      → on_subscribe(empty), on_complete
///   └─ Ok(Some(v))   → mapper(v)
///                        ├─ failure          → on_subscribe(empty), on_error
///                        ├─ scalar Ok(Some)  → on_subscribe(ScalarSubscription)
///                        ├─ scalar Ok(None)  → on_subscribe(empty), on_complete
///                        ├─ scalar Err       → on_subscribe(empty), on_error
///                        └─ not scalar       → publisher.subscribe(actual)
/// ```
pub(super) fn try_subscribe_scalar_map<T, R>(
    source: &PublisherRef<T>,
    actual: &SubscriberRef<R>,
    mapper: &Mapper<T, R>,
    hooks: &Hooks,
) -> bool
where
    T: Debug + Send + 'static,
    R: Send + 'static,
{
    let Some(outcome) = mapper::evaluate(source.as_ref(), None) else {
        return false;
    };

    let value = match outcome {
        Ok(Some(v)) => v,
        Ok(None) => {
            subscriptions::complete(actual);
            return true;
        }
        Err(e) => {
            subscriptions::error(actual, e);
            return true;
        }
    };

    let mapped = match mapper::apply(mapper, value) {
        Ok(m) => m,
        Err(e) => {
            subscriptions::error(actual, e);
            return true;
        }
    };

    match mapper::evaluate(mapped.publisher.as_ref(), Some(mapped.value.as_str())) {
        Some(Ok(Some(v))) => actual.on_subscribe(Arc::new(ScalarSubscription::new(
            Arc::clone(actual),
            v,
            hooks.clone(),
        ))),
        Some(Ok(None)) => subscriptions::complete(actual),
        Some(Err(e)) => subscriptions::error(actual, e),
        None => mapped.publisher.subscribe(Arc::clone(actual)),
    }
    true
}
