//! # Default dropped-error handler.
//!
//! [`LogDropped`] writes every dropped error through `tracing` at `warn` level:
//! ```text
//! WARN flowmap::hooks: error dropped label=flow_source error=connection reset
//! ```

use tracing::warn;

use crate::error::FlowError;
use crate::hooks::OnErrorDropped;

/// Logs dropped errors through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDropped;

impl OnErrorDropped for LogDropped {
    fn on_error_dropped(&self, error: &FlowError) {
        warn!(
            target: "flowmap::hooks",
            label = error.as_label(),
            error = %error,
            "error dropped"
        );
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
