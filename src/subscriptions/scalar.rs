//! # One-shot subscription for a value that is already available.
//!
//! [`ScalarSubscription`] emits its value on the first valid `request` and then
//! completes, unless it was cancelled in between.
//!
//! ```text
//!   READY ── request(n > 0) ──► EMITTED  (on_next(v), on_complete() unless cancelled)
//!     │
//!     └──── cancel() ─────────► CANCELLED
//! ```
//!
//! Whichever call moves the state away from `READY` owns the value: the request
//! that emits it or the cancel that drops it. No lock is taken on either path.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::flow::{SubscriberRef, Subscription};
use crate::hooks::Hooks;
use crate::subscriptions::demand;

const READY: u8 = 0;
const EMITTED: u8 = 1;
const CANCELLED: u8 = 2;

/// Subscription delivering one ready value to `actual` on first demand.
pub struct ScalarSubscription<T> {
    actual: SubscriberRef<T>,
    value: UnsafeCell<Option<T>>,
    state: AtomicU8,
    hooks: Hooks,
}

// SAFETY: `value` is only touched by the single call that leaves READY.
unsafe impl<T: Send> Sync for ScalarSubscription<T> {}

impl<T: Send + 'static> ScalarSubscription<T> {
    /// Creates a subscription that will deliver `value` to `actual`.
    pub fn new(actual: SubscriberRef<T>, value: T, hooks: Hooks) -> Self {
        Self {
            actual,
            value: UnsafeCell::new(Some(value)),
            state: AtomicU8::new(READY),
            hooks,
        }
    }

    /// Returns `true` once the value has been handed to the subscriber.
    pub fn is_emitted(&self) -> bool {
        self.state.load(Ordering::Acquire) == EMITTED
    }
}

impl<T: Send + 'static> Subscription for ScalarSubscription<T> {
    fn request(&self, n: u64) {
        if !demand::validate_request(n, &self.hooks) {
            return;
        }
        if self
            .state
            .compare_exchange(READY, EMITTED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        // SAFETY: this call won READY -> EMITTED, so it is the only taker.
        let value = unsafe { (*self.value.get()).take() };
        if let Some(v) = value {
            self.actual.on_next(v);
            if self.state.load(Ordering::Acquire) != CANCELLED {
                self.actual.on_complete();
            }
        }
    }

    fn cancel(&self) {
        let prev = self.state.swap(CANCELLED, Ordering::AcqRel);
        if prev == READY {
            // SAFETY: this call won READY -> CANCELLED, so it is the only taker.
            drop(unsafe { (*self.value.get()).take() });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{CollectDropped, TestSubscriber};

    #[test]
    fn test_emits_on_first_request_then_completes() {
        let sub = TestSubscriber::<i32>::with_request(0);
        let s = ScalarSubscription::new(sub.clone(), 42, Hooks::default());

        assert!(sub.values().is_empty());
        s.request(1);
        assert!(s.is_emitted());
        assert_eq!(sub.values(), vec![42]);
        assert_eq!(sub.completions(), 1);

        s.request(5);
        assert_eq!(sub.values(), vec![42]);
        assert_eq!(sub.completions(), 1);
    }

    #[test]
    fn test_cancel_before_request_emits_nothing() {
        let sub = TestSubscriber::<i32>::with_request(0);
        let s = ScalarSubscription::new(sub.clone(), 42, Hooks::default());

        s.cancel();
        s.request(1);
        assert!(sub.values().is_empty());
        assert_eq!(sub.completions(), 0);
    }

    #[test]
    fn test_zero_request_is_rejected() {
        let dropped = Arc::new(CollectDropped::default());
        let hooks = Hooks::default().with_error_dropped(dropped.clone());
        let sub = TestSubscriber::<i32>::with_request(0);
        let s = ScalarSubscription::new(sub.clone(), 1, hooks);

        s.request(0);
        assert!(sub.values().is_empty());
        assert_eq!(dropped.labels(), vec!["flow_invalid_request"]);

        s.request(1);
        assert_eq!(sub.values(), vec![1]);
    }

    #[test]
    fn test_cancel_drops_the_value() {
        let sub = TestSubscriber::<Arc<u8>>::with_request(0);
        let value = Arc::new(7u8);
        let s = ScalarSubscription::new(sub.clone(), Arc::clone(&value), Hooks::default());
        assert_eq!(Arc::strong_count(&value), 2);

        s.cancel();
        assert_eq!(Arc::strong_count(&value), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_emit_once() {
        for _ in 0..64 {
            let sub = TestSubscriber::<u32>::with_request(0);
            let s = Arc::new(ScalarSubscription::new(sub.clone(), 5, Hooks::default()));

            let mut handles = Vec::new();
            for _ in 0..4 {
                let s = Arc::clone(&s);
                handles.push(tokio::spawn(async move { s.request(1) }));
            }
            for h in handles {
                h.await.expect("requester");
            }

            assert_eq!(sub.values(), vec![5]);
            assert_eq!(sub.completions(), 1);
        }
    }
}
