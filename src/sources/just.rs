//! # Constant sources: [`Just`], [`Empty`] and [`Fail`].
//!
//! `Just` and `Empty` are scalar: operators can read their outcome through
//! [`Publisher::try_scalar`] without subscribing. `Fail` is not, so its error
//! always travels through `on_error`.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{BoxError, FlowError};
use crate::flow::{Publisher, SubscriberRef};
use crate::hooks::Hooks;
use crate::subscriptions::{self, ScalarSubscription};

/// Scalar publisher of one clonable value.
#[derive(Debug, Clone)]
pub struct Just<T> {
    value: T,
    hooks: Hooks,
}

impl<T> Just<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
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

impl<T> Publisher<T> for Just<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: SubscriberRef<T>) {
        let s = ScalarSubscription::new(
            Arc::clone(&subscriber),
            self.value.clone(),
            self.hooks.clone(),
        );
        subscriber.on_subscribe(Arc::new(s));
    }

    fn try_scalar(&self) -> Option<Result<Option<T>, BoxError>> {
        Some(Ok(Some(self.value.clone())))
    }
}

/// Scalar publisher completing without a value.
#[derive(Debug)]
pub struct Empty<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Empty<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Empty<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Publisher<T> for Empty<T> {
    fn subscribe(&self, subscriber: SubscriberRef<T>) {
        subscriptions::complete(&subscriber);
    }

    fn try_scalar(&self) -> Option<Result<Option<T>, BoxError>> {
        Some(Ok(None))
    }
}

/// Publisher failing each subscriber with the same message.
#[derive(Debug)]
pub struct Fail<T> {
    message: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Fail<T> {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            _marker: PhantomData,
        }
    }
}

impl<T: Send + 'static> Publisher<T> for Fail<T> {
    fn subscribe(&self, subscriber: SubscriberRef<T>) {
        subscriptions::error(&subscriber, FlowError::upstream(self.message.clone()));
    }
}
