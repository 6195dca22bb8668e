//! # flowmap
//!
//! **flowmap** maps the single value of a publisher to a multi-value publisher and
//! relays the latter's signals downstream, honoring demand end to end.
//!
//! It is a small, lock-free reaction layer: it creates no threads or tasks and is
//! driven entirely by whoever delivers signals and whoever requests values.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐                               ┌──────────────┐
//!     │ outer source │  (at most one value)          │  downstream  │
//!     └──────┬───────┘                               └──┬────────▲──┘
//!            │ on_subscribe / on_next / on_error /      │        │
//!            │ on_complete                  request(n)  │        │ on_next*
//!            ▼                              cancel()    ▼        │ on_error / on_complete
//! ┌───────────────────────────────────────────────────────────┐  │
//! │  FlattenCoordinator                                       │  │
//! │  - outer: SubscriptionSlot (cancel only, UNBOUNDED)       │  │
//! │  - inner: SubscriptionSlot (set once, lazily)             │  │
//! │  - requested: AtomicU64 (demand before inner exists)      │  │
//! │  - has_value: AtomicBool                                  │  │
//! └──────┬────────────────────────────────────────▲───────────┘  │
//!        │ mapper(value)                          │ try_install  │
//!        ▼                                        │              │
//!  ┌──────────────────┐   subscribe(relay)  ┌─────┴──────┐       │
//!  │ secondary source │ ──────────────────► │ InnerRelay │ ──────┘
//!  └──────────────────┘                     └────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! FlatMapMany::subscribe(downstream)
//!   ├─► source.try_scalar() is Some ─► fast path (no coordinator)
//!   └─► source.subscribe(FlattenCoordinator)
//!         ├─ on_subscribe(s)  ─► downstream.on_subscribe(self), s.request(UNBOUNDED)
//!         ├─ on_next(v)       ─► has_value = true; mapper(v)
//!         │     ├─ Err / panic / None ─► cancel(), downstream.on_error(..)
//!         │     ├─ scalar publisher   ─► ScalarSubscription as inner | on_complete | on_error
//!         │     └─ publisher          ─► publisher.subscribe(InnerRelay)
//!         ├─ on_error(e)      ─► has_value ? hooks.error_dropped(e) : downstream.on_error(e)
//!         └─ on_complete()    ─► has_value ? ignore : downstream.on_complete()
//!
//! InnerRelay terminal ─► release both slots, downstream.on_complete() / on_error(e)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Contract**      | Publish/subscribe traits with demand-based flow control.      | [`Publisher`], [`Subscriber`], [`Subscription`] |
//! | **Operator**      | Flat-map a single value into a multi-value publisher.         | [`FlatMapMany`], [`PublisherExt`]           |
//! | **Building blocks** | Set-once slot, scalar/empty subscriptions, demand helpers.  | [`SubscriptionSlot`], [`ScalarSubscription`] |
//! | **Sources**       | Synchronous sources for composition and tests.                | [`sources::just`], [`sources::from_iter`]   |
//! | **Hooks**         | Out-of-band reporting of undeliverable errors.                | [`Hooks`], [`OnErrorDropped`], [`LogDropped`] |
//! | **Errors**        | Typed errors with stable labels.                              | [`FlowError`]                               |
//! | **Streams**       | Consume any publisher as a `futures::Stream`.                 | [`into_stream`], [`StreamConfig`]           |
//!
//! ## Optional features
//! - `testing`: exports the [`testing`] module (`TestSubscriber`, `TestPublisher`,
//!   `CollectDropped`).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use flowmap::{FlowError, Publisher, PublisherExt, Subscriber, SubscriptionRef, sources};
//! use std::sync::Mutex;
//!
//! struct Print(Mutex<Vec<String>>);
//!
//! impl Subscriber<String> for Print {
//!     fn on_subscribe(&self, s: SubscriptionRef) {
//!         s.request(2);
//!     }
//!     fn on_next(&self, v: String) {
//!         self.0.lock().unwrap().push(v);
//!     }
//!     fn on_error(&self, e: FlowError) {
//!         self.0.lock().unwrap().push(format!("error: {e}"));
//!     }
//!     fn on_complete(&self) {
//!         self.0.lock().unwrap().push("done".into());
//!     }
//! }
//!
//! let words = sources::just("hello world").flat_map_many(|line: &'static str| {
//!     let words: Vec<String> = line.split(' ').map(str::to_string).collect();
//!     Ok(Some(sources::from_iter(words)))
//! });
//!
//! let print = Arc::new(Print(Mutex::new(Vec::new())));
//! words.subscribe(print.clone());
//! assert_eq!(*print.0.lock().unwrap(), vec!["hello", "world", "done"]);
//! ```
mod error;
mod flow;
mod hooks;
mod operators;
pub mod sources;
mod stream;
pub mod subscriptions;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// ---- Public re-exports ----

pub use error::{BoxError, FlowError};
pub use flow::{Publisher, PublisherRef, Subscriber, SubscriberRef, Subscription, SubscriptionRef, UNBOUNDED};
pub use hooks::{Hooks, LogDropped, OnErrorDropped};
pub use operators::{FlatMapMany, Mapper, PublisherExt};
pub use stream::{SignalStream, StreamConfig, into_stream};
pub use subscriptions::{EmptySubscription, ScalarSubscription, SubscriptionSlot};
