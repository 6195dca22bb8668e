//! # Basic synchronous sources.
//!
//! | Constructor         | Values            | Scalar | Demand                     |
//! |---------------------|-------------------|--------|----------------------------|
//! | [`just`]            | exactly one       | yes    | emits on first request     |
//! | [`empty`]           | none              | yes    | completes immediately      |
//! | [`fail`]            | none, errors      | no     | errors immediately         |
//! | [`from_callable`]   | zero or one       | yes    | emits on first request     |
//! | [`from_iter`]       | any number        | no     | emits within demand        |
//!
//! All of them signal on the caller's thread; none spawns.
//! Constructors return a [`PublisherRef`] so they can be handed to a mapper as is.

mod callable;
mod iter;
mod just;

use std::sync::Arc;

pub use callable::FromCallable;
pub use iter::FromIter;
pub use just::{Empty, Fail, Just};

use crate::error::BoxError;
use crate::flow::PublisherRef;

/// Scalar publisher of one value.
pub fn just<T>(value: T) -> PublisherRef<T>
where
    T: Clone + Send + Sync + 'static,
{
    Arc::new(Just::new(value))
}

/// Scalar publisher completing without a value.
pub fn empty<T: Send + 'static>() -> PublisherRef<T> {
    Arc::new(Empty::new())
}

/// Publisher failing every subscriber with [`FlowError::Source`](crate::FlowError::Source).
pub fn fail<T: Send + 'static>(message: impl Into<String>) -> PublisherRef<T> {
    Arc::new(Fail::new(message))
}

/// Scalar publisher computing its value on each subscription or scalar probe.
pub fn from_callable<T, F>(f: F) -> PublisherRef<T>
where
    T: Send + 'static,
    F: Fn() -> Result<Option<T>, BoxError> + Send + Sync + 'static,
{
    Arc::new(FromCallable::new(f))
}

/// Publisher emitting the given items within demand, then completing.
pub fn from_iter<I>(items: I) -> PublisherRef<I::Item>
where
    I: IntoIterator,
    I::Item: Clone + Send + Sync + 'static,
{
    Arc::new(FromIter::new(items))
}
