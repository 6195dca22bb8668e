//! Demand validation and accumulation.
//!
//! Demand is a `u64` counter where [`UNBOUNDED`] (`u64::MAX`) means "no limit".
//! Additions saturate instead of overflowing, so a counter that reached
//! `UNBOUNDED` stays there.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::FlowError;
use crate::flow::UNBOUNDED;
use crate::hooks::Hooks;

/// Returns `true` when `n` is a valid request amount.
///
/// Zero is rejected and reported to the dropped-error sink as
/// [`FlowError::InvalidRequest`].
pub fn validate_request(n: u64, hooks: &Hooks) -> bool {
    if n == 0 {
        hooks.error_dropped(FlowError::InvalidRequest { requested: n });
        return false;
    }
    true
}

/// Adds two demand amounts, saturating at [`UNBOUNDED`].
#[inline]
pub fn add_capped(a: u64, b: u64) -> u64 {
    a.saturating_add(b)
}

/// Atomically adds `n` to `requested`, saturating at [`UNBOUNDED`].
///
/// Returns the previous value.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use flowmap::subscriptions::demand::add_cap;
///
/// let requested = AtomicU64::new(u64::MAX - 1);
/// assert_eq!(add_cap(&requested, 5), u64::MAX - 1);
/// assert_eq!(requested.load(Ordering::Acquire), u64::MAX);
/// ```
pub fn add_cap(requested: &AtomicU64, n: u64) -> u64 {
    let mut current = requested.load(Ordering::Acquire);
    loop {
        if current == UNBOUNDED {
            return UNBOUNDED;
        }
        let next = add_capped(current, n);
        match requested.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(prev) => return prev,
            Err(actual) => current = actual,
        }
    }
}

/// Atomically subtracts `n` emitted values from `requested`, unless unbounded.
///
/// Returns the remaining demand.
pub fn produced(requested: &AtomicU64, n: u64) -> u64 {
    let mut current = requested.load(Ordering::Acquire);
    loop {
        if current == UNBOUNDED {
            return UNBOUNDED;
        }
        let next = current.saturating_sub(n);
        match requested.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => return next,
            Err(actual) => current = actual,
        }
    }
}
