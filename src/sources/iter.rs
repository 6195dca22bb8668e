//! # Multi-value source honoring demand.
//!
//! Each subscriber gets its own cursor over a shared, immutable item list.
//!
//! ## Emission loop
//! ```text
//! request(n) ── add_cap(requested, n) ── previous == 0 ? ──► drain (this thread)
//!                                            │
//!                                            └── else: the active drainer sees the new demand
//! drain: emit while emitted < requested; then produced(emitted);
//!        stop when the counter reaches 0, the list is exhausted, or on cancel.
//! ```
//! Only the thread that moved the counter away from zero emits, so signals stay
//! serial even when `request` is called from several threads.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::flow::{Publisher, SubscriberRef, Subscription};
use crate::hooks::Hooks;
use crate::subscriptions::{self, demand};

/// Publisher of a fixed list of items.
pub struct FromIter<T> {
    items: Arc<[T]>,
    hooks: Hooks,
}

impl<T> FromIter<T> {
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self {
            items: items.into_iter().collect::<Vec<_>>().into(),
            hooks: Hooks::default(),
        }
    }

    /// Replaces the hooks used to report invalid requests.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> fmt::Debug for FromIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromIter")
            .field("len", &self.items.len())
            .finish()
    }
}

impl<T> Publisher<T> for FromIter<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: SubscriberRef<T>) {
        if self.items.is_empty() {
            subscriptions::complete(&subscriber);
            return;
        }
        let s = IterSubscription {
            actual: Arc::clone(&subscriber),
            items: Arc::clone(&self.items),
            index: AtomicUsize::new(0),
            requested: AtomicU64::new(0),
            done: AtomicBool::new(false),
            hooks: self.hooks.clone(),
        };
        subscriber.on_subscribe(Arc::new(s));
    }
}

struct IterSubscription<T> {
    actual: SubscriberRef<T>,
    items: Arc<[T]>,
    /// Cursor; only touched by the active drainer.
    index: AtomicUsize,
    requested: AtomicU64,
    /// Set on cancel or after the terminal signal.
    done: AtomicBool,
    hooks: Hooks,
}

impl<T> IterSubscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drain(&self, mut n: u64) {
        let mut emitted = 0u64;
        loop {
            while emitted != n {
                if self.done.load(Ordering::Acquire) {
                    return;
                }
                let i = self.index.load(Ordering::Relaxed);
                let Some(item) = self.items.get(i) else {
                    self.finish();
                    return;
                };
                self.actual.on_next(item.clone());
                self.index.store(i + 1, Ordering::Relaxed);
                emitted += 1;

                if i + 1 == self.items.len() {
                    self.finish();
                    return;
                }
            }

            n = self.requested.load(Ordering::Acquire);
            if n == emitted {
                n = demand::produced(&self.requested, emitted);
                if n == 0 {
                    return;
                }
                emitted = 0;
            }
        }
    }

    fn finish(&self) {
        if !self.done.swap(true, Ordering::AcqRel) {
            self.actual.on_complete();
        }
    }
}

impl<T> Subscription for IterSubscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn request(&self, n: u64) {
        if !demand::validate_request(n, &self.hooks) {
            return;
        }
        if demand::add_cap(&self.requested, n) == 0 {
            self.drain(n);
        }
    }

    fn cancel(&self) {
        self.done.store(true, Ordering::Release);
    }
}
