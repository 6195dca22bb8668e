use std::sync::Arc;

/// Demand value meaning "no limit".
///
/// Demand additions saturate at this value, so once reached it stays unbounded.
pub const UNBOUNDED: u64 = u64::MAX;

/// Handle a subscriber uses to pull values and to stop the sequence.
///
/// Implementations must tolerate concurrent calls with the publisher's signals.
/// `cancel` is idempotent; `request` after `cancel` is a no-op.
pub trait Subscription: Send + Sync + 'static {
    /// Adds `n` to the outstanding demand. `n` must be strictly positive.
    fn request(&self, n: u64);

    /// Asks the publisher to stop signalling and to release its resources.
    fn cancel(&self);
}

/// Shared handle to a subscription.
pub type SubscriptionRef = Arc<dyn Subscription>;
