//! Error types carried by flow signals.
//!
//! [`FlowError`] is the single error type travelling through `on_error` and
//! through the dropped-error sink ([`Hooks`](crate::Hooks)). It covers:
//!
//! - **operator failures** raised while mapping or evaluating a scalar source;
//! - **protocol violations** (duplicate subscription, zero demand);
//! - **upstream failures** produced by sources themselves.
//!
//! Like the rest of the crate it provides `as_label` / `as_message` helpers for
//! logs and metrics.

use std::any::Any;

use thiserror::Error;

/// Boxed error used for failures coming from user code (mappers, callables, sources).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Errors travelling through a flow.
///
/// Operator and no-publisher errors carry the `Debug` rendering of the value that
/// triggered them, so a failure can be traced back to its input.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FlowError {
    /// A mapper or scalar evaluation failed (returned an error or panicked).
    #[error("operator failed{}: {source}", describe(.value))]
    Operator {
        /// `Debug` rendering of the value being processed, if there was one.
        value: Option<String>,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },

    /// The mapper returned no publisher for a value.
    #[error("the mapper returned no publisher for value {value}")]
    NoPublisher {
        /// `Debug` rendering of the offending value.
        value: String,
    },

    /// A second subscription was offered to a slot that already holds one.
    #[error("subscription already set; the duplicate was cancelled")]
    DuplicateSubscription,

    /// Demand must be strictly positive.
    #[error("invalid request of {requested}; demand must be > 0")]
    InvalidRequest {
        /// The rejected amount.
        requested: u64,
    },

    /// Failure signalled by a source.
    #[error("{source}")]
    Source {
        /// The underlying failure.
        #[source]
        source: BoxError,
    },
}

fn describe(value: &Option<String>) -> String {
    match value {
        Some(v) => format!(" on value {v}"),
        None => String::new(),
    }
}

impl FlowError {
    /// Wraps a failure raised while processing `value`.
    pub fn operator(source: impl Into<BoxError>, value: Option<String>) -> Self {
        FlowError::Operator {
            value,
            source: source.into(),
        }
    }

    /// Wraps a failure signalled by a source.
    ///
    /// # Example
    /// ```
    /// use flowmap::FlowError;
    ///
    /// let err = FlowError::upstream("connection reset");
    /// assert_eq!(err.to_string(), "connection reset");
    /// assert_eq!(err.as_label(), "flow_source");
    /// ```
    pub fn upstream(source: impl Into<BoxError>) -> Self {
        FlowError::Source {
            source: source.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            FlowError::Operator { .. } => "flow_operator",
            FlowError::NoPublisher { .. } => "flow_no_publisher",
            FlowError::DuplicateSubscription => "flow_duplicate_subscription",
            FlowError::InvalidRequest { .. } => "flow_invalid_request",
            FlowError::Source { .. } => "flow_source",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            FlowError::Operator { value, source } => match value {
                Some(v) => format!("operator: {source} (value={v})"),
                None => format!("operator: {source}"),
            },
            FlowError::NoPublisher { value } => format!("no publisher (value={value})"),
            FlowError::DuplicateSubscription => "duplicate subscription".to_string(),
            FlowError::InvalidRequest { requested } => format!("invalid request: {requested}"),
            FlowError::Source { source } => format!("source: {source}"),
        }
    }

    /// Returns the value attached to an operator or no-publisher error.
    pub fn value(&self) -> Option<&str> {
        match self {
            FlowError::Operator { value, .. } => value.as_deref(),
            FlowError::NoPublisher { value } => Some(value),
            _ => None,
        }
    }

    /// Indicates whether the error is a protocol violation (never delivered downstream).
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            FlowError::DuplicateSubscription | FlowError::InvalidRequest { .. }
        )
    }
}

/// Runs `f`, turning a panic into a [`BoxError`] carrying the panic message.
pub(crate) fn catch_panic<F, X>(f: F) -> Result<X, BoxError>
where
    F: FnOnce() -> Result<X, BoxError>,
{
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(res) => res,
        Err(payload) => Err(panic_message(payload.as_ref()).into()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked: unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_error_mentions_value() {
        let err = FlowError::operator("boom", Some("\"x\"".to_string()));
        assert_eq!(err.to_string(), "operator failed on value \"x\": boom");
        assert_eq!(err.value(), Some("\"x\""));
        assert_eq!(err.as_label(), "flow_operator");
    }

    #[test]
    fn test_operator_error_without_value() {
        let err = FlowError::operator("boom", None);
        assert_eq!(err.to_string(), "operator failed: boom");
        assert_eq!(err.as_message(), "operator: boom");
    }

    #[test]
    fn test_protocol_violations() {
        assert!(FlowError::DuplicateSubscription.is_protocol_violation());
        assert!(FlowError::InvalidRequest { requested: 0 }.is_protocol_violation());
        assert!(!FlowError::upstream("x").is_protocol_violation());
    }

    #[test]
    fn test_catch_panic_converts_payload() {
        let res: Result<(), BoxError> = catch_panic(|| panic!("kaput"));
        let err = res.unwrap_err();
        assert_eq!(err.to_string(), "panicked: kaput");

        let res = catch_panic(|| Ok::<_, BoxError>(7));
        assert_eq!(res.unwrap(), 7);
    }

    #[test]
    fn test_source_error_is_transparent_in_display() {
        let err = FlowError::upstream(std::io::Error::other("disk gone"));
        assert_eq!(err.to_string(), "disk gone");
        assert!(std::error::Error::source(&err).is_some());
    }
}
