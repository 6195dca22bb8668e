//! # Set-once subscription cell.
//!
//! [`SubscriptionSlot`] moves forward only, through these phases:
//!
//! ```text
//!            set_once(s)                    (payload written)
//!   EMPTY ───────────────► INSTALLING ───────────────────────► SET(s)
//!     │                        │                                 │
//!     │ terminate / release    │ terminate / release             │ terminate → s.cancel(), drop s
//!     ▼                        ▼                                 │ release   → drop s
//!   CANCELLED | RELEASED ◄─────┴─────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - A real subscription is never replaced; a second `set_once` is cancelled and
//!   reported as [`FlowError::DuplicateSubscription`].
//! - `set_once` on a closed slot cancels the incoming subscription silently.
//! - `terminate` cancels the installed subscription exactly once, whichever side
//!   wins a concurrent `set_once`/`terminate` race.
//! - Closing the slot (`terminate` or `release`) drops the payload, so a slot never
//!   keeps a finished subscription (and whatever it references) alive.
//!
//! ## Payload access
//! The payload sits in an `UnsafeCell` guarded by one state word holding the phase
//! and a count of active readers:
//! - only the `set_once` caller that won `EMPTY → INSTALLING` writes it;
//! - [`get`](SubscriptionSlot::get) takes a reader ticket while the phase is `SET`,
//!   clones the `Arc` and returns the ticket;
//! - the payload is taken out by whoever observes "closed from `SET`, no readers":
//!   the closing call itself, or the last reader leaving after it.

use std::cell::UnsafeCell;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use crate::error::FlowError;
use crate::flow::SubscriptionRef;
use crate::hooks::Hooks;

const PHASE: usize = 0b111;
const EMPTY: usize = 0;
const INSTALLING: usize = 1;
const SET: usize = 2;
const CANCELLED: usize = 3;
const RELEASED: usize = 4;

const READER: usize = 1 << 3;

#[inline]
fn phase(state: usize) -> usize {
    state & PHASE
}

#[inline]
fn is_closed(state: usize) -> bool {
    matches!(phase(state), CANCELLED | RELEASED)
}

/// Lock-free set-once holder for a subscription with terminal closed markers.
pub struct SubscriptionSlot {
    state: AtomicUsize,
    payload: UnsafeCell<Option<SubscriptionRef>>,
}

// SAFETY: every access to `payload` is serialized by `state` (see module docs).
unsafe impl Sync for SubscriptionSlot {}

impl SubscriptionSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self {
            state: AtomicUsize::new(EMPTY),
            payload: UnsafeCell::new(None),
        }
    }

    /// Installs `subscription` if the slot is empty.
    ///
    /// Returns `false` (and cancels `subscription`) when the slot was closed or
    /// already held a subscription; the latter is also reported to `hooks`.
    pub fn set_once(&self, subscription: SubscriptionRef, hooks: &Hooks) -> bool {
        if let Err(current) =
            self.state
                .compare_exchange(EMPTY, INSTALLING, Ordering::AcqRel, Ordering::Acquire)
        {
            subscription.cancel();
            if !is_closed(current) {
                hooks.error_dropped(FlowError::DuplicateSubscription);
            }
            return false;
        }

        // SAFETY: INSTALLING is exclusive to this call; no reader is admitted before SET.
        unsafe { *self.payload.get() = Some(subscription) };

        match self
            .state
            .compare_exchange(INSTALLING, SET, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(_) => {
                // Closed while installing: the payload is still exclusively ours.
                // SAFETY: the closing call left the payload alone (it did not see SET).
                let installed = unsafe { (*self.payload.get()).take() };
                if let Some(s) = installed {
                    debug!("subscription installed after the slot closed; cancelling it");
                    s.cancel();
                }
                false
            }
        }
    }

    /// Returns the installed subscription, if the slot is set and still open.
    pub fn get(&self) -> Option<SubscriptionRef> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if phase(current) != SET {
                return None;
            }
            match self.state.compare_exchange_weak(
                current,
                current + READER,
                Ordering::Acquire,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        // SAFETY: the reader ticket keeps the payload in place until `leave`.
        let subscription = unsafe { (*self.payload.get()).clone() };
        self.leave();
        subscription
    }

    /// Closes the slot, cancelling an installed subscription.
    ///
    /// Returns `true` if this call performed the transition.
    pub fn terminate(&self) -> bool {
        self.close(CANCELLED)
    }

    /// Closes the slot and drops an installed subscription without cancelling it.
    ///
    /// Used once the sequence behind the subscription has terminated on its own.
    /// Returns `true` if this call performed the transition.
    pub fn release(&self) -> bool {
        self.close(RELEASED)
    }

    /// Returns `true` once [`terminate`](Self::terminate) has been called.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        phase(self.state.load(Ordering::Acquire)) == CANCELLED
    }

    /// Returns `true` once the slot was terminated or released.
    #[inline]
    pub fn is_closed(&self) -> bool {
        is_closed(self.state.load(Ordering::Acquire))
    }

    fn close(&self, to: usize) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if is_closed(current) {
                return false;
            }
            let next = (current & !PHASE) | to;
            match self
                .state
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    if phase(current) == SET && current < READER {
                        self.dispose(to);
                    }
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }

    fn leave(&self) {
        let previous = self.state.fetch_sub(READER, Ordering::AcqRel);
        let now = previous - READER;
        // Last reader out of a slot closed while it was reading.
        if now < READER && is_closed(now) {
            self.dispose(phase(now));
        }
    }

    fn dispose(&self, closed_as: usize) {
        // SAFETY: called exactly once, by the party that observed "closed from SET"
        // with no reader left; no reader can be admitted anymore.
        let installed = unsafe { (*self.payload.get()).take() };
        if let Some(s) = installed {
            if closed_as == CANCELLED {
                s.cancel();
            }
        }
    }
}

impl Default for SubscriptionSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SubscriptionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match phase(self.state.load(Ordering::Acquire)) {
            EMPTY => "empty",
            INSTALLING => "installing",
            SET => "set",
            CANCELLED => "cancelled",
            _ => "released",
        };
        f.debug_struct("SubscriptionSlot")
            .field("state", &state)
            .finish()
    }
}
