//! Typed conversion of resolved option values.
//!
//! A transform that cannot interpret a value signals it either by returning
//! `None` or by failing with [`TransformError::InvalidArgument`]. Both are
//! treated as "no value" so the caller's default applies. Any other
//! transform failure reaches the caller as [`PermissionError::Transform`].

use errors::{PermissionError, TransformError};
use tracing::debug;

use crate::telemetry::ResolverTelemetry;

/// Result shapes a value transform may return.
pub trait Coerced<T> {
    fn into_coerced(self) -> Result<Option<T>, TransformError>;
}

impl<T> Coerced<T> for Option<T> {
    fn into_coerced(self) -> Result<Option<T>, TransformError> {
        Ok(self)
    }
}

impl<T, E> Coerced<T> for Result<T, E>
where
    E: Into<TransformError>,
{
    fn into_coerced(self) -> Result<Option<T>, TransformError> {
        self.map(Some).map_err(Into::into)
    }
}

/// Applies `transform` to a resolved value.
pub fn coerce<T, R, F>(value: &str, transform: F) -> Result<Option<T>, PermissionError>
where
    F: FnOnce(&str) -> R,
    R: Coerced<T>,
{
    coerce_with(ResolverTelemetry::disabled(), value, transform)
}

pub(crate) fn coerce_with<T, R, F>(
    telemetry: ResolverTelemetry,
    value: &str,
    transform: F,
) -> Result<Option<T>, PermissionError>
where
    F: FnOnce(&str) -> R,
    R: Coerced<T>,
{
    match transform(value).into_coerced() {
        Ok(Some(coerced)) => Ok(Some(coerced)),
        Ok(None) => {
            debug!("Transform produced no value");
            telemetry.record_coercion_failure();
            Ok(None)
        }
        Err(TransformError::InvalidArgument { reason }) => {
            debug!(%reason, "Transform rejected value");
            telemetry.record_coercion_failure();
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Applies `transform` to a value that may be absent. Absent values are
/// never passed to the transform.
pub(crate) fn coerce_resolved<T, R, F>(
    telemetry: ResolverTelemetry,
    value: Option<String>,
    transform: F,
) -> Result<Option<T>, PermissionError>
where
    F: FnOnce(&str) -> R,
    R: Coerced<T>,
{
    match value {
        Some(value) => coerce_with(telemetry, &value, transform),
        None => Ok(None),
    }
}
