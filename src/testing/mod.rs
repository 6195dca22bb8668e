//! # Test doubles for flows.
//!
//! Compiled for the crate's own tests and behind the `testing` feature:
//!
//! - [`TestSubscriber`]: records every signal and drives demand by hand.
//! - [`TestPublisher`]: a source driven by the test (`next`, `error`, `complete`)
//!   whose [`TestSubscription`] records requests and cancellation.
//! - [`CollectDropped`]: collects errors reported to the dropped-error sink.
//!
//! ## Example
//! ```
//! # #[cfg(feature = "testing")]
//! # {
//! use flowmap::testing::{TestPublisher, TestSubscriber};
//! use flowmap::Publisher;
//!
//! let source = TestPublisher::<&'static str>::new();
//! let sub = TestSubscriber::new();
//! source.subscribe(sub.clone());
//! source.next("a");
//! source.complete();
//!
//! assert_eq!(sub.values(), vec!["a"]);
//! assert_eq!(sub.kinds(), vec!["subscribe", "next", "complete"]);
//! # }
//! ```

mod dropped;
mod publisher;
mod subscriber;

pub use dropped::CollectDropped;
pub use publisher::{TestPublisher, TestSubscription};
pub use subscriber::{Signal, TestSubscriber};
