//! # Subscription building blocks shared by operators and sources.
//!
//! - [`demand`]: validation and saturating accumulation of requested amounts.
//! - [`SubscriptionSlot`]: lock-free set-once cell that drops its subscription once closed.
//! - [`ScalarSubscription`]: one-shot subscription emitting a single ready value.
//! - [`EmptySubscription`] with the [`complete`] / [`error`] helpers for sequences
//!   that terminate right after `on_subscribe`.

pub mod demand;
mod empty;
mod scalar;
mod slot;

pub use empty::{EmptySubscription, complete, error};
pub use scalar::ScalarSubscription;
pub use slot::SubscriptionSlot;
