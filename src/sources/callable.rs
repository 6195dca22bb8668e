//! # Lazily computed scalar source.
//!
//! [`FromCallable`] evaluates its function on every subscription and every scalar
//! probe. `Ok(None)` completes empty; an error or a panic fails the subscriber
//! with [`FlowError::Operator`].

use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, FlowError, catch_panic};
use crate::flow::{Publisher, SubscriberRef};
use crate::hooks::Hooks;
use crate::subscriptions::{self, ScalarSubscription};

/// Scalar publisher backed by a synchronous computation.
///
/// The computation runs once per subscription (and once per
/// [`try_scalar`](Publisher::try_scalar) probe). A panic counts as a failure.
pub struct FromCallable<F> {
    f: F,
    hooks: Hooks,
}

impl<F> FromCallable<F> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            hooks: Hooks::default(),
        }
    }

    /// Replaces the hooks used to report invalid requests.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }
}

impl<F> fmt::Debug for FromCallable<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromCallable").finish_non_exhaustive()
    }
}

impl<T, F> Publisher<T> for FromCallable<F>
where
    T: Send + 'static,
    F: Fn() -> Result<Option<T>, BoxError> + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: SubscriberRef<T>) {
        match catch_panic(|| (self.f)()) {
            Ok(Some(v)) => {
                let s = ScalarSubscription::new(Arc::clone(&subscriber), v, self.hooks.clone());
                subscriber.on_subscribe(Arc::new(s));
            }
            Ok(None) => subscriptions::complete(&subscriber),
            Err(e) => subscriptions::error(&subscriber, FlowError::operator(e, None)),
        }
    }

    fn try_scalar(&self) -> Option<Result<Option<T>, BoxError>> {
        Some(catch_panic(|| (self.f)()))
    }
}
