//! # Entry point: `FlatMapMany`.
//!
//! ## Example
//! ```
//! use flowmap::{Publisher, PublisherExt, sources};
//! # use flowmap::{FlowError, Subscriber, SubscriptionRef};
//! # use std::sync::{Arc, Mutex};
//! # struct Collect(Mutex<Vec<u32>>);
//! # impl Subscriber<u32> for Collect {
//! #     fn on_subscribe(&self, s: SubscriptionRef) { s.request(u64::MAX) }
//! #     fn on_next(&self, v: u32) { self.0.lock().unwrap().push(v) }
//! #     fn on_error(&self, _e: FlowError) {}
//! #     fn on_complete(&self) {}
//! # }
//!
//! let digits = sources::just(3u32).flat_map_many(|n: u32| Ok(Some(sources::from_iter(0..n))));
//!
//! let sink = Arc::new(Collect(Mutex::new(Vec::new())));
//! digits.subscribe(sink.clone());
//! assert_eq!(*sink.0.lock().unwrap(), vec![0, 1, 2]);
//! ```

use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::error::BoxError;
use crate::flow::{Publisher, PublisherRef, SubscriberRef};
use crate::hooks::Hooks;
use crate::operators::fast_path::try_subscribe_scalar_map;
use crate::operators::flatten::FlattenCoordinator;
use crate::operators::mapper::Mapper;

/// Publisher mapping the single value of `source` to the publisher returned by
/// `mapper`, and relaying that publisher's signals.
///
/// ### Properties
/// - **Demand-aware**: downstream demand reaches the secondary publisher, including
///   demand requested before it existed.
/// - **Scalar fast path**: scalar sources and scalar mapped publishers skip the
///   subscription machinery.
/// - **Single result**: an outer error after the value was received is dropped to
///   [`Hooks`], never delivered.
pub struct FlatMapMany<T, R> {
    source: PublisherRef<T>,
    mapper: Mapper<T, R>,
    hooks: Hooks,
}

impl<T, R> FlatMapMany<T, R>
where
    T: Debug + Send + 'static,
    R: Send + 'static,
{
    /// Creates the operator with default [`Hooks`].
    pub fn new<P, F>(source: P, mapper: F) -> Self
    where
        P: Publisher<T>,
        F: Fn(T) -> Result<Option<PublisherRef<R>>, BoxError> + Send + Sync + 'static,
    {
        Self {
            source: Arc::new(source),
            mapper: Arc::new(mapper),
            hooks: Hooks::default(),
        }
    }

    /// Replaces the hooks used for dropped errors.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Returns the operator as a shared publisher handle.
    pub fn into_ref(self) -> PublisherRef<R> {
        Arc::new(self)
    }
}

impl<T, R> Publisher<R> for FlatMapMany<T, R>
where
    T: Debug + Send + 'static,
    R: Send + 'static,
{
    fn subscribe(&self, subscriber: SubscriberRef<R>) {
        if try_subscribe_scalar_map(&self.source, &subscriber, &self.mapper, &self.hooks) {
            return;
        }
        let coordinator =
            FlattenCoordinator::new(subscriber, Arc::clone(&self.mapper), self.hooks.clone());
        self.source.subscribe(coordinator);
    }
}

impl<T, R> fmt::Debug for FlatMapMany<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatMapMany")
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

/// Operator constructors available on every publisher.
pub trait PublisherExt<T>: Publisher<T> + Sized {
    /// Maps the single value of `self` to a publisher and relays its signals.
    ///
    /// See [`FlatMapMany`].
    fn flat_map_many<R, F>(self, mapper: F) -> FlatMapMany<T, R>
    where
        T: Debug + Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Result<Option<PublisherRef<R>>, BoxError> + Send + Sync + 'static,
    {
        FlatMapMany::new(self, mapper)
    }
}

impl<T, P: Publisher<T>> PublisherExt<T> for P {}
