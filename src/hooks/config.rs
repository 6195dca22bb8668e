//! # Hooks configuration.
//!
//! [`Hooks`] is passed by value to every operator instance (cheap to clone, it
//! only holds `Arc`s). The default configuration logs dropped errors through
//! [`LogDropped`].

use std::fmt;
use std::sync::Arc;

use crate::error::FlowError;
use crate::hooks::{LogDropped, OnErrorDropped};

/// Out-of-band reporting configuration for operators.
///
/// ## Field semantics
/// - `on_error_dropped`: receives errors that cannot reach a subscriber, such as an
///   upstream error arriving after a result was committed, a duplicate
///   subscription, or zero demand.
#[derive(Clone)]
pub struct Hooks {
    /// Handler for errors that cannot be delivered downstream.
    pub on_error_dropped: Arc<dyn OnErrorDropped>,
}

impl Hooks {
    /// Replaces the dropped-error handler.
    #[must_use]
    pub fn with_error_dropped(mut self, handler: Arc<dyn OnErrorDropped>) -> Self {
        self.on_error_dropped = handler;
        self
    }

    /// Reports an error that cannot be delivered downstream.
    #[inline]
    pub fn error_dropped(&self, error: FlowError) {
        self.on_error_dropped.on_error_dropped(&error);
    }
}

impl Default for Hooks {
    /// Dropped errors are logged through [`LogDropped`].
    fn default() -> Self {
        Self {
            on_error_dropped: Arc::new(LogDropped),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_error_dropped", &self.on_error_dropped.name())
            .finish()
    }
}
