//! # Out-of-band reporting for errors that cannot be delivered.
//!
//! Some failures have nowhere to go: the downstream subscriber already has its
//! result, or the failing signal was itself a protocol violation. Those errors are
//! handed to an [`OnErrorDropped`] handler configured through [`Hooks`].
//!
//! ## Architecture
//! ```text
//! operator ── hooks.error_dropped(err) ──► Hooks ──► OnErrorDropped::on_error_dropped(&err)
//!                                                          │
//!                                              ┌───────────┴───────────┐
//!                                              ▼                       ▼
//!                                          LogDropped               Custom
//!                                       (tracing, default)     (metrics, alerts)
//! ```
//!
//! ## Implementing a custom handler
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use flowmap::{FlowError, Hooks, OnErrorDropped};
//!
//! #[derive(Default)]
//! struct CountDropped(AtomicUsize);
//!
//! impl OnErrorDropped for CountDropped {
//!     fn on_error_dropped(&self, _error: &FlowError) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! let counter = Arc::new(CountDropped::default());
//! let hooks = Hooks::default().with_error_dropped(counter.clone());
//! hooks.error_dropped(FlowError::DuplicateSubscription);
//! assert_eq!(counter.0.load(Ordering::Relaxed), 1);
//! ```

mod config;
mod dropped;
mod log;

pub use config::Hooks;
pub use dropped::OnErrorDropped;
pub use log::LogDropped;
