//! # Bridge from a publisher to a `futures::Stream`.
//!
//! [`into_stream`] subscribes a channel-backed subscriber and returns a
//! [`SignalStream`] yielding `Result<T, FlowError>`.
//!
//! ## Architecture
//! ```text
//! Publisher ── on_next/on_error/on_complete ──► StreamSubscriber ── unbounded mpsc ──► SignalStream
//!     ▲                                                                                 │
//!     └──────────────── request(limit) every `limit` consumed items ◄──────────────────┘
//! ```
//!
//! ## Rules
//! - `prefetch` items are requested up front (`0` = unbounded).
//! - After `limit = prefetch - prefetch / 4` items have been polled, `limit` more
//!   are requested, so the channel never holds more than `prefetch` items.
//! - An error is yielded as the last item; completion ends the stream.
//! - Dropping the stream before it ends cancels the subscription.
//!
//! ## Example
//! ```
//! use futures::StreamExt;
//! use flowmap::{PublisherExt, StreamConfig, into_stream, sources};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let op = sources::just(2u8).flat_map_many(|n| Ok(Some(sources::from_iter(0..n))));
//! let items: Vec<_> = into_stream(op, StreamConfig::default())
//!     .map(|r| r.expect("no error"))
//!     .collect()
//!     .await;
//! assert_eq!(items, vec![0, 1]);
//! # }
//! ```

mod bridge;
mod config;

pub use bridge::{SignalStream, into_stream};
pub use config::StreamConfig;
