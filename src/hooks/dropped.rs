use crate::error::FlowError;

/// Contract for dropped-error handlers.
///
/// Called synchronously on whatever thread delivered the offending signal, so
/// implementations must be quick and must not block.
pub trait OnErrorDropped: Send + Sync + 'static {
    /// Handle one error that could not be delivered downstream.
    fn on_error_dropped(&self, error: &FlowError);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
