use parking_lot::Mutex;

use crate::error::FlowError;
use crate::hooks::OnErrorDropped;

/// Dropped-error handler that keeps every error for later inspection.
#[derive(Debug, Default)]
pub struct CollectDropped {
    errors: Mutex<Vec<FlowError>>,
}

impl CollectDropped {
    /// Labels of the collected errors, in arrival order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.errors.lock().iter().map(FlowError::as_label).collect()
    }

    /// `Display` renderings of the collected errors, in arrival order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.lock().iter().map(ToString::to_string).collect()
    }

    /// Number of collected errors.
    pub fn len(&self) -> usize {
        self.errors.lock().len()
    }

    /// Returns `true` if nothing was dropped.
    pub fn is_empty(&self) -> bool {
        self.errors.lock().is_empty()
    }
}

impl OnErrorDropped for CollectDropped {
    fn on_error_dropped(&self, error: &FlowError) {
        // FlowError is not Clone; keep an equivalent copy.
        let copy = match error {
            FlowError::Operator { value, source } => {
                FlowError::operator(source.to_string(), value.clone())
            }
            FlowError::NoPublisher { value } => FlowError::NoPublisher {
                value: value.clone(),
            },
            FlowError::DuplicateSubscription => FlowError::DuplicateSubscription,
            FlowError::InvalidRequest { requested } => FlowError::InvalidRequest {
                requested: *requested,
            },
            FlowError::Source { source } => FlowError::upstream(source.to_string()),
        };
        self.errors.lock().push(copy);
    }

    fn name(&self) -> &'static str {
        "collect"
    }
}
