//! # Permission Resolver Errors
//!
//! Error types shared by every crate of the permission resolver.
//!
//! - [`PermissionError`] is what callers of the query API see.
//! - [`ProviderError`] is what a provider returns when its own evaluation
//!   fails. The chains never catch it; it surfaces as
//!   [`PermissionError::Provider`].
//! - [`TransformError`] is what a value transform returns. Only the
//!   [`TransformError::InvalidArgument`] kind is treated as "no value".

use std::convert::Infallible;
use std::num::{ParseFloatError, ParseIntError};
use std::str::ParseBoolError;

use thiserror::Error;

/// Errors surfaced by permission and option queries
#[derive(Debug, Error)]
pub enum PermissionError {
    /// A caller contract violation, raised before any provider is consulted.
    #[error("Invalid input: {field} reason: {reason}")]
    InvalidInput { field: String, reason: String },

    /// The subject has no online representation.
    #[error("Unsupported subject: {subject}")]
    UnsupportedSubject { subject: String },

    /// A provider failed while evaluating a query.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A value transform failed with something other than a parse mismatch.
    #[error("Value transform failed: {reason}")]
    Transform { reason: String },
}

impl PermissionError {
    pub fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_subject(subject: impl std::fmt::Display) -> Self {
        Self::UnsupportedSubject {
            subject: subject.to_string(),
        }
    }
}

/// Errors raised by a provider's own evaluation
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider {provider} failed: {reason}")]
    Failed { provider: String, reason: String },

    #[error("Provider {provider} unavailable: {reason}")]
    Unavailable { provider: String, reason: String },
}

impl ProviderError {
    pub fn failed(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn unavailable(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by a value transform
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// The value could not be interpreted. Coercion turns this into "no value".
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Any other failure. Coercion propagates this to the caller.
    #[error("Transform fault: {reason}")]
    Fault { reason: String },
}

impl TransformError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn fault(reason: impl Into<String>) -> Self {
        Self::Fault {
            reason: reason.into(),
        }
    }
}

impl From<ParseIntError> for TransformError {
    fn from(err: ParseIntError) -> Self {
        Self::invalid_argument(err.to_string())
    }
}

impl From<ParseFloatError> for TransformError {
    fn from(err: ParseFloatError) -> Self {
        Self::invalid_argument(err.to_string())
    }
}

impl From<ParseBoolError> for TransformError {
    fn from(err: ParseBoolError) -> Self {
        Self::invalid_argument(err.to_string())
    }
}

impl From<uuid::Error> for TransformError {
    fn from(err: uuid::Error) -> Self {
        Self::invalid_argument(err.to_string())
    }
}

impl From<Infallible> for TransformError {
    fn from(err: Infallible) -> Self {
        match err {}
    }
}

impl From<TransformError> for PermissionError {
    fn from(err: TransformError) -> Self {
        Self::Transform {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors_are_invalid_arguments() {
        let err: TransformError = "abc".parse::<i32>().unwrap_err().into();
        assert!(matches!(err, TransformError::InvalidArgument { .. }));

        let err: TransformError = "maybe".parse::<bool>().unwrap_err().into();
        assert!(matches!(err, TransformError::InvalidArgument { .. }));
    }

    #[test]
    fn test_provider_error_is_transparent() {
        let err: PermissionError = ProviderError::failed("ldap", "connection reset").into();
        assert_eq!(err.to_string(), "Provider ldap failed: connection reset");
    }

    #[test]
    fn test_invalid_input_message() {
        let err = PermissionError::invalid_input("key", "must not be empty");
        assert_eq!(err.to_string(), "Invalid input: key reason: must not be empty");
    }
}
