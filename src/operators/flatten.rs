//! # Flatten coordinator.
//!
//! [`FlattenCoordinator`] is both the subscriber of the outer source and the
//! subscription handed to downstream. It owns:
//!
//! - the outer subscription (set once, used for cancellation only);
//! - the inner subscription, installed lazily when the secondary source (or a
//!   scalar result) reports it;
//! - the demand requested by downstream before the inner subscription exists.
//!
//! ## Rules
//! - Outer demand is always `UNBOUNDED`: the outer source yields at most one value.
//! - Demand recorded before installation is handed to the inner subscription in a
//!   single `request`, exactly once: `request` adds then re-checks the slot,
//!   installation swaps the counter to zero.
//! - After the outer value arrived, the secondary sequence owns termination:
//!   outer completion is ignored and an outer error is dropped to the hooks.
//! - `cancel` terminates both slots; an installation racing with it is cancelled.
//!
//! ## Ownership
//! ```text
//! downstream ──► coordinator ──► outer slot ──► outer subscription ──► coordinator
//!                     │
//!                     └────────► inner slot ──► inner subscription ──► InnerRelay ──► coordinator
//! ```
//! Both loops are cut when the slots close: an outer terminal releases the outer
//! slot, an inner terminal (or an outer terminal without value, or a mapping
//! failure) releases both, and `cancel` terminates both.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::error::FlowError;
use crate::flow::{Subscriber, SubscriberRef, Subscription, SubscriptionRef, UNBOUNDED};
use crate::hooks::Hooks;
use crate::operators::mapper::{self, Mapper};
use crate::subscriptions::{ScalarSubscription, SubscriptionSlot, demand};

/// Coordinator for one downstream subscription.
pub(crate) struct FlattenCoordinator<T, R> {
    me: Weak<Self>,
    downstream: SubscriberRef<R>,
    mapper: Mapper<T, R>,
    hooks: Hooks,
    outer: SubscriptionSlot,
    inner: SubscriptionSlot,
    /// Demand accumulated while `inner` is empty.
    requested: AtomicU64,
    has_value: AtomicBool,
}

impl<T, R> FlattenCoordinator<T, R>
where
    T: Debug + Send + 'static,
    R: Send + 'static,
{
    pub(crate) fn new(
        downstream: SubscriberRef<R>,
        mapper: Mapper<T, R>,
        hooks: Hooks,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            downstream,
            mapper,
            hooks,
            outer: SubscriptionSlot::new(),
            inner: SubscriptionSlot::new(),
            requested: AtomicU64::new(0),
            has_value: AtomicBool::new(false),
        })
    }

    /// Installs the inner subscription and hands it the pending demand.
    ///
    /// Returns `false` if the coordinator was closed or already had an inner
    /// subscription; `subscription` is cancelled in both cases.
    pub(crate) fn try_install_inner(&self, subscription: SubscriptionRef) -> bool {
        if !self.inner.set_once(subscription, &self.hooks) {
            return false;
        }
        let pending = self.requested.swap(0, Ordering::AcqRel);
        if pending != 0 {
            if let Some(inner) = self.inner.get() {
                inner.request(pending);
            }
        }
        true
    }

    /// Drops both subscriptions once the flow has terminated on its own.
    fn release(&self) {
        self.outer.release();
        self.inner.release();
    }

    fn fail(&self, error: FlowError) {
        self.cancel();
        self.downstream.on_error(error);
    }
}

impl<T, R> Subscription for FlattenCoordinator<T, R>
where
    T: Debug + Send + 'static,
    R: Send + 'static,
{
    fn request(&self, n: u64) {
        if !demand::validate_request(n, &self.hooks) {
            return;
        }
        if let Some(inner) = self.inner.get() {
            inner.request(n);
            return;
        }
        if self.inner.is_closed() {
            return;
        }

        demand::add_cap(&self.requested, n);

        // The inner subscription may have been installed between the first check
        // and the add; whoever swaps the counter forwards it.
        if let Some(inner) = self.inner.get() {
            let pending = self.requested.swap(0, Ordering::AcqRel);
            if pending != 0 {
                inner.request(pending);
            }
        }
    }

    fn cancel(&self) {
        self.outer.terminate();
        self.inner.terminate();
    }
}

impl<T, R> Subscriber<T> for FlattenCoordinator<T, R>
where
    T: Debug + Send + 'static,
    R: Send + 'static,
{
    fn on_subscribe(&self, subscription: SubscriptionRef) {
        if !self.outer.set_once(subscription, &self.hooks) {
            return;
        }
        let Some(me) = self.me.upgrade() else {
            return;
        };
        self.downstream.on_subscribe(me);

        if let Some(outer) = self.outer.get() {
            outer.request(UNBOUNDED);
        }
    }

    fn on_next(&self, value: T) {
        self.has_value.store(true, Ordering::Release);

        let mapped = match mapper::apply(&self.mapper, value) {
            Ok(m) => m,
            Err(e) => return self.fail(e),
        };

        let outcome = mapper::evaluate(mapped.publisher.as_ref(), Some(mapped.value.as_str()));
        if let Some(outcome) = outcome {
            match outcome {
                Ok(Some(v)) => {
                    let scalar = ScalarSubscription::new(
                        Arc::clone(&self.downstream),
                        v,
                        self.hooks.clone(),
                    );
                    self.try_install_inner(Arc::new(scalar));
                }
                Ok(None) => {
                    self.release();
                    self.downstream.on_complete();
                }
                Err(e) => self.fail(e),
            }
            return;
        }

        let Some(parent) = self.me.upgrade() else {
            return;
        };
        mapped.publisher.subscribe(Arc::new(InnerRelay {
            parent,
            downstream: Arc::clone(&self.downstream),
        }));
    }

    fn on_error(&self, error: FlowError) {
        if self.has_value.load(Ordering::Acquire) {
            self.outer.release();
            self.hooks.error_dropped(error);
            return;
        }
        self.release();
        self.downstream.on_error(error);
    }

    fn on_complete(&self) {
        if self.has_value.load(Ordering::Acquire) {
            self.outer.release();
            return;
        }
        self.release();
        self.downstream.on_complete();
    }
}

/// Subscriber of the secondary source: signals go straight to downstream, the
/// subscription goes to the coordinator.
///
/// Holds the coordinator strongly: the secondary source may report its
/// subscription after everyone else let go of the coordinator.
struct InnerRelay<T, R> {
    parent: Arc<FlattenCoordinator<T, R>>,
    downstream: SubscriberRef<R>,
}

impl<T, R> Subscriber<R> for InnerRelay<T, R>
where
    T: Debug + Send + 'static,
    R: Send + 'static,
{
    fn on_subscribe(&self, subscription: SubscriptionRef) {
        self.parent.try_install_inner(subscription);
    }

    fn on_next(&self, value: R) {
        self.downstream.on_next(value);
    }

    fn on_error(&self, error: FlowError) {
        self.parent.release();
        self.downstream.on_error(error);
    }

    fn on_complete(&self) {
        self.parent.release();
        self.downstream.on_complete();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::BoxError;
    use crate::flow::{Publisher, PublisherRef};
    use crate::sources;
    use crate::testing::{CollectDropped, TestPublisher, TestSubscriber, TestSubscription};

    fn hooks() -> (Hooks, Arc<CollectDropped>) {
        let dropped = Arc::new(CollectDropped::default());
        (Hooks::default().with_error_dropped(dropped.clone()), dropped)
    }

    fn mapper_to<R: Clone + Send + 'static>(
        inner: TestPublisher<R>,
    ) -> Mapper<&'static str, R> {
        Arc::new(move |_v: &'static str| Ok(Some(inner.to_ref() as PublisherRef<R>)))
    }

    #[test]
    fn test_demand_before_inner_is_forwarded_once() {
        let (hooks, dropped) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let inner = TestPublisher::<i32>::manual();
        let down = TestSubscriber::<i32>::with_request(0);

        let coordinator = FlattenCoordinator::new(down.clone(), mapper_to(inner.clone()), hooks);
        outer.subscribe(coordinator);
        assert_eq!(outer.request_calls(), vec![UNBOUNDED]);

        down.request(2);
        down.request(5);
        outer.next("a");
        assert_eq!(inner.subscriber_count(), 1);
        assert!(inner.request_calls().is_empty());

        inner.signal_subscribe();
        assert_eq!(inner.request_calls(), vec![7]);

        down.request(1);
        assert_eq!(inner.request_calls(), vec![7, 1]);
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_inner_signals_reach_downstream() {
        let (hooks, _) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let inner = TestPublisher::<i32>::new();
        let down = TestSubscriber::<i32>::with_request(3);

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper_to(inner.clone()), hooks));
        outer.next("a");
        inner.next(1);
        inner.next(2);
        inner.error("late failure");

        assert_eq!(down.values(), vec![1, 2]);
        assert_eq!(down.error_labels(), vec!["flow_source"]);
        assert_eq!(inner.request_calls(), vec![3]);
    }

    #[test]
    fn test_outer_complete_without_value_completes_downstream() {
        let (hooks, _) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let inner = TestPublisher::<i32>::new();
        let down = TestSubscriber::<i32>::new();

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper_to(inner.clone()), hooks));
        outer.complete();

        assert_eq!(down.kinds(), vec!["subscribe", "complete"]);
        assert_eq!(inner.subscriber_count(), 0);
    }

    #[test]
    fn test_outer_complete_after_value_is_ignored() {
        let (hooks, _) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let inner = TestPublisher::<i32>::new();
        let down = TestSubscriber::<i32>::new();

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper_to(inner.clone()), hooks));
        outer.next("a");
        outer.complete();
        assert_eq!(down.completions(), 0);

        inner.complete();
        assert_eq!(down.completions(), 1);
    }

    #[test]
    fn test_outer_error_before_value_is_delivered() {
        let (hooks, dropped) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let down = TestSubscriber::<i32>::new();

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper_to(TestPublisher::new()), hooks));
        outer.error("boom");

        assert_eq!(down.map_errors(ToString::to_string), vec!["boom".to_string()]);
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_outer_error_after_value_is_dropped() {
        let (hooks, dropped) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let inner = TestPublisher::<i32>::new();
        let down = TestSubscriber::<i32>::new();

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper_to(inner.clone()), hooks));
        outer.next("a");
        outer.error("too late");

        assert!(down.error_labels().is_empty());
        assert_eq!(dropped.messages(), vec!["too late".to_string()]);

        inner.next(9);
        inner.complete();
        assert_eq!(down.values(), vec![9]);
        assert_eq!(down.completions(), 1);
    }

    #[test]
    fn test_cancel_before_outer_subscription() {
        let (hooks, dropped) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let down = TestSubscriber::<i32>::new();

        let coordinator = FlattenCoordinator::new(down.clone(), mapper_to(TestPublisher::new()), hooks);
        coordinator.cancel();
        outer.subscribe(coordinator);

        assert!(outer.is_cancelled());
        assert!(outer.request_calls().is_empty());
        assert!(down.kinds().is_empty());
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_cancel_propagates_to_outer_and_inner() {
        let (hooks, _) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let inner = TestPublisher::<i32>::new();
        let down = TestSubscriber::<i32>::new();

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper_to(inner.clone()), hooks));
        outer.next("a");
        down.cancel();

        assert_eq!(outer.subscription().cancel_count(), 1);
        assert_eq!(inner.subscription().cancel_count(), 1);
    }

    #[test]
    fn test_cancel_before_inner_cancels_late_installation() {
        let (hooks, _) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let inner = TestPublisher::<i32>::manual();
        let down = TestSubscriber::<i32>::with_request(4);

        let coordinator = FlattenCoordinator::new(down.clone(), mapper_to(inner.clone()), hooks);
        outer.subscribe(coordinator.clone());
        outer.next("a");
        coordinator.cancel();
        coordinator.cancel();
        inner.signal_subscribe();

        assert_eq!(outer.subscription().cancel_count(), 1);
        assert!(inner.is_cancelled());
        assert!(inner.request_calls().is_empty());
    }

    #[test]
    fn test_duplicate_inner_subscription_is_rejected() {
        let (hooks, dropped) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let inner = TestPublisher::<i32>::new();
        let down = TestSubscriber::<i32>::with_request(1);

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper_to(inner.clone()), hooks));
        outer.next("a");

        let rogue = Arc::new(TestSubscription::new());
        inner.offer_subscription(rogue.clone());

        assert!(rogue.is_cancelled());
        assert!(!inner.is_cancelled());
        assert_eq!(dropped.labels(), vec!["flow_duplicate_subscription"]);

        down.request(2);
        assert_eq!(inner.request_calls(), vec![1, 2]);
        assert!(rogue.request_calls().is_empty());
    }

    #[test]
    fn test_duplicate_outer_subscription_is_rejected() {
        let (hooks, dropped) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let down = TestSubscriber::<i32>::new();

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper_to(TestPublisher::new()), hooks));
        let rogue = Arc::new(TestSubscription::new());
        outer.offer_subscription(rogue.clone());

        assert!(rogue.is_cancelled());
        assert_eq!(down.subscriptions(), 1);
        assert_eq!(dropped.labels(), vec!["flow_duplicate_subscription"]);
    }

    #[test]
    fn test_mapper_error_carries_value() {
        let (hooks, _) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let down = TestSubscriber::<i32>::new();
        let mapper: Mapper<&'static str, i32> = Arc::new(|_v: &'static str| Err(BoxError::from("E")));

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper, hooks));
        outer.next("x");

        assert_eq!(down.kinds(), vec!["subscribe", "error"]);
        assert_eq!(down.map_errors(|e| e.value().map(str::to_string)), vec![Some("\"x\"".to_string())]);
        assert_eq!(outer.subscription().cancel_count(), 1);
        assert_eq!(
            down.map_errors(ToString::to_string),
            vec!["operator failed on value \"x\": E".to_string()]
        );
    }

    #[test]
    fn test_mapper_panic_is_captured() {
        let (hooks, _) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let down = TestSubscriber::<i32>::new();
        let mapper: Mapper<&'static str, i32> = Arc::new(|v: &'static str| -> Result<Option<PublisherRef<i32>>, BoxError> {
            panic!("cannot map {v}")
        });

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper, hooks));
        outer.next("x");

        assert_eq!(down.error_labels(), vec!["flow_operator"]);
        assert_eq!(
            down.map_errors(ToString::to_string),
            vec!["operator failed on value \"x\": panicked: cannot map x".to_string()]
        );
    }

    #[test]
    fn test_mapper_returning_none() {
        let (hooks, _) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let down = TestSubscriber::<i32>::new();
        let mapper: Mapper<&'static str, i32> = Arc::new(|_v: &'static str| Ok(None));

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper, hooks));
        outer.next("x");

        assert_eq!(down.error_labels(), vec!["flow_no_publisher"]);
        assert!(down.values().is_empty());
    }

    #[test]
    fn test_scalar_result_waits_for_demand() {
        let (hooks, _) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let down = TestSubscriber::<usize>::with_request(0);
        let mapper: Mapper<&'static str, usize> = Arc::new(|v: &'static str| Ok(Some(sources::just(v.len()))));

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper, hooks));
        outer.next("abc");
        assert_eq!(down.kinds(), vec!["subscribe"]);

        down.request(1);
        assert_eq!(down.values(), vec![3]);
        assert_eq!(down.kinds(), vec!["subscribe", "next", "complete"]);
    }

    #[test]
    fn test_scalar_empty_result_completes() {
        let (hooks, _) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let down = TestSubscriber::<i32>::new();
        let mapper: Mapper<&'static str, i32> = Arc::new(|_v: &'static str| Ok(Some(sources::empty())));

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper, hooks));
        outer.next("a");
        outer.complete();

        assert_eq!(down.kinds(), vec!["subscribe", "complete"]);
    }

    #[test]
    fn test_scalar_evaluation_failure_carries_value() {
        let (hooks, _) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let down = TestSubscriber::<i32>::new();
        let mapper: Mapper<&'static str, i32> = Arc::new(|_v: &'static str| {
            Ok(Some(sources::from_callable(|| Err(BoxError::from("eval failed")))))
        });

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper, hooks));
        outer.next("q");

        assert_eq!(
            down.map_errors(ToString::to_string),
            vec!["operator failed on value \"q\": eval failed".to_string()]
        );
    }

    #[test]
    fn test_zero_request_is_reported_not_forwarded() {
        let (hooks, dropped) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let inner = TestPublisher::<i32>::new();
        let down = TestSubscriber::<i32>::with_request(0);

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper_to(inner.clone()), hooks));
        down.request(0);
        outer.next("a");

        assert!(inner.request_calls().is_empty());
        assert_eq!(dropped.labels(), vec!["flow_invalid_request"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_and_installation_lose_nothing() {
        for _ in 0..64 {
            let (hooks, _) = hooks();
            let outer = TestPublisher::<&'static str>::new();
            let inner = TestPublisher::<i32>::manual();
            let down = TestSubscriber::<i32>::with_request(0);

            outer.subscribe(FlattenCoordinator::new(down.clone(), mapper_to(inner.clone()), hooks));
            outer.next("a");

            let requester = {
                let down = down.clone();
                tokio::spawn(async move {
                    for _ in 0..100 {
                        down.request(1);
                        tokio::task::yield_now().await;
                    }
                })
            };
            let installer = {
                let inner = inner.clone();
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    inner.signal_subscribe();
                })
            };
            requester.await.expect("requester");
            installer.await.expect("installer");

            assert_eq!(inner.subscription().total_requested(), 100);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cancel_racing_installation_cancels_inner_once() {
        for _ in 0..64 {
            let (hooks, dropped) = hooks();
            let outer = TestPublisher::<&'static str>::new();
            let inner = TestPublisher::<i32>::manual();
            let down = TestSubscriber::<i32>::with_request(3);

            outer.subscribe(FlattenCoordinator::new(down.clone(), mapper_to(inner.clone()), hooks));
            outer.next("a");

            let installer = {
                let inner = inner.clone();
                tokio::spawn(async move { inner.signal_subscribe() })
            };
            let canceller = {
                let down = down.clone();
                tokio::spawn(async move { down.cancel() })
            };
            installer.await.expect("installer");
            canceller.await.expect("canceller");

            assert_eq!(inner.subscription().cancel_count(), 1);
            assert_eq!(outer.subscription().cancel_count(), 1);
            let requests = inner.request_calls();
            assert!(requests.is_empty() || requests == vec![3], "requests: {requests:?}");
            assert!(dropped.is_empty());
        }
    }

    /// Requests everything on subscribe and keeps no handle to the subscription.
    #[derive(Default)]
    struct RequestAll {
        values: parking_lot::Mutex<Vec<i32>>,
        completed: AtomicBool,
    }

    impl Subscriber<i32> for RequestAll {
        fn on_subscribe(&self, subscription: SubscriptionRef) {
            subscription.request(UNBOUNDED);
        }

        fn on_next(&self, value: i32) {
            self.values.lock().push(value);
        }

        fn on_error(&self, _error: FlowError) {}

        fn on_complete(&self) {
            self.completed.store(true, Ordering::Release);
        }
    }

    #[test]
    fn test_inner_subscription_after_outer_let_go() {
        let (hooks, _) = hooks();
        let inner = TestPublisher::<i32>::manual();
        let down = Arc::new(RequestAll::default());

        // `just` completes right after its value and drops its handle on the coordinator.
        sources::just("a").subscribe(FlattenCoordinator::new(down.clone(), mapper_to(inner.clone()), hooks));
        assert_eq!(inner.subscriber_count(), 1);

        inner.signal_subscribe();
        assert!(!inner.is_cancelled());
        assert_eq!(inner.request_calls(), vec![UNBOUNDED]);

        inner.next(4);
        inner.complete();
        assert_eq!(*down.values.lock(), vec![4]);
        assert!(down.completed.load(Ordering::Acquire));
    }

    #[test]
    fn test_inner_completion_releases_outer_subscription() {
        let (hooks, _) = hooks();
        let outer = TestPublisher::<&'static str>::new();
        let inner = TestPublisher::<i32>::new();
        let down = TestSubscriber::<i32>::new();

        outer.subscribe(FlattenCoordinator::new(down.clone(), mapper_to(inner.clone()), hooks));
        outer.next("a");
        let held = Arc::strong_count(&outer.subscription());

        inner.complete();
        assert_eq!(Arc::strong_count(&outer.subscription()), held - 1);
        assert_eq!(Arc::strong_count(&inner.subscription()), 2);
        assert!(!outer.is_cancelled());
        assert!(!inner.is_cancelled());
    }
}
