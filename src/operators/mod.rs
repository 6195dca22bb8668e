//! # Operators.
//!
//! [`FlatMapMany`] turns a publisher of at most one value into the multi-value
//! publisher returned by a mapper for that value.
//!
//! ## Architecture
//! ```text
//!                        subscribe(downstream)
//!                                 │
//!                  ┌──────────────┴──────────────┐
//!        source is scalar?                 otherwise
//!                  ▼                              ▼
//!           fast path                   FlattenCoordinator ◄── outer source
//!   (evaluate, map, evaluate/subscribe)     │ on_next(v)
//!                  │                        ├─► mapper(v) ─► scalar? ─► ScalarSubscription
//!                  │                        └─► InnerRelay ◄── secondary source
//!                  ▼                                │
//!             downstream ◄──────────────────────────┘
//! ```
//!
//! ## Lifecycle of one subscription
//! ```text
//! downstream.on_subscribe(coordinator)       ◄── outer.on_subscribe, outer.request(UNBOUNDED)
//! downstream.request(n)  ─► pending += n     (no inner yet)
//! outer.on_next(v)       ─► mapper(v) ─► secondary.subscribe(relay)
//! relay.on_subscribe(s)  ─► install s, s.request(pending)
//! secondary.on_next(r)*  ─► downstream.on_next(r)*
//! outer.on_complete      ─► release outer slot (value already received)
//! secondary.on_complete  ─► release both slots, downstream.on_complete
//! ```

mod fast_path;
mod flat_map_many;
mod flatten;
mod mapper;

pub use flat_map_many::{FlatMapMany, PublisherExt};
pub use mapper::Mapper;
