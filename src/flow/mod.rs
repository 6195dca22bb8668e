//! # Publish/subscribe contract.
//!
//! Three small traits describe how signals move between a producer and a consumer:
//!
//! ```text
//!   Publisher<T> ── subscribe(subscriber) ──► Subscriber<T>
//!                                                │
//!        ◄────── request(n) / cancel() ──── Subscription
//!        ──────► on_subscribe, on_next*, (on_error | on_complete)?
//! ```
//!
//! ## Rules
//! - `on_subscribe` is always the first signal, delivered once per subscription.
//! - Signals from one publisher to one subscriber are delivered **serially**.
//! - At most one terminal signal (`on_error` or `on_complete`) ends the sequence.
//! - No `on_next` is delivered beyond the total demand requested.
//! - `request` and `cancel` may be called from any thread, concurrently with signals.
//! - A subscriber should release its subscription once a terminal signal arrives,
//!   which unwinds the `Arc` graph between operator stages.

mod publisher;
mod subscriber;
mod subscription;

pub use publisher::{Publisher, PublisherRef};
pub use subscriber::{Subscriber, SubscriberRef};
pub use subscription::{Subscription, SubscriptionRef, UNBOUNDED};
