//! Mapper type and the guarded evaluation steps shared by the fast path and the
//! coordinator.

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::{BoxError, FlowError, catch_panic};
use crate::flow::{Publisher, PublisherRef};

/// Function mapping the outer value to the secondary publisher.
///
/// - `Ok(Some(p))`: subscribe to `p`;
/// - `Ok(None)`: no publisher, signalled downstream as [`FlowError::NoPublisher`];
/// - `Err(e)` (or a panic): signalled downstream as [`FlowError::Operator`].
pub type Mapper<T, R> =
    Arc<dyn Fn(T) -> Result<Option<PublisherRef<R>>, BoxError> + Send + Sync + 'static>;

/// Secondary publisher together with the rendering of the value it came from.
pub(super) struct Mapped<R> {
    pub publisher: PublisherRef<R>,
    pub value: String,
}

/// Applies `mapper` to `value`, capturing failures with the value attached.
pub(super) fn apply<T, R>(mapper: &Mapper<T, R>, value: T) -> Result<Mapped<R>, FlowError>
where
    T: Debug,
{
    let rendered = format!("{value:?}");
    match catch_panic(|| (mapper.as_ref())(value)) {
        Ok(Some(publisher)) => Ok(Mapped {
            publisher,
            value: rendered,
        }),
        Ok(None) => Err(FlowError::NoPublisher { value: rendered }),
        Err(e) => Err(FlowError::operator(e, Some(rendered))),
    }
}

/// Evaluates `publisher` if it is a scalar publisher.
///
/// `None` means "not scalar, subscribe normally".
pub(super) fn evaluate<P, R>(
    publisher: &P,
    value: Option<&str>,
) -> Option<Result<Option<R>, FlowError>>
where
    P: Publisher<R> + ?Sized,
{
    match catch_panic(|| Ok(publisher.try_scalar())) {
        Ok(None) => None,
        Ok(Some(Ok(v))) => Some(Ok(v)),
        Ok(Some(Err(e))) | Err(e) => Some(Err(FlowError::operator(e, value.map(str::to_string)))),
    }
}
