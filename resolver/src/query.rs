//! Input checks shared by the query facades.

use std::sync::Arc;

use errors::PermissionError;
use perm_core::{Identity, Source, Subject, SubjectReducer};

pub(crate) fn require_key(field: &str, key: &str) -> Result<(), PermissionError> {
    if key.is_empty() {
        return Err(PermissionError::invalid_input(field, "must not be empty"));
    }
    Ok(())
}

pub(crate) fn require_identity(identity: Identity) -> Result<(), PermissionError> {
    if identity.is_nil() {
        return Err(PermissionError::invalid_input("identity", "must not be nil"));
    }
    Ok(())
}

/// Reduces `entity` and insists on an online result.
pub(crate) fn reduce_online<E: ?Sized>(
    reducer: &(impl SubjectReducer<E> + ?Sized),
    entity: &E,
) -> Result<Arc<dyn Source>, PermissionError> {
    match reducer.reduce(entity)? {
        Subject::Online(source) => Ok(source),
        unresolved @ Subject::Unresolved(_) => {
            Err(PermissionError::unsupported_subject(unresolved))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_key() {
        assert!(require_key("permission", "fly").is_ok());
        let err = require_key("permission", "").unwrap_err();
        assert!(matches!(
            err,
            PermissionError::InvalidInput { field, .. } if field == "permission"
        ));
    }

    #[test]
    fn test_require_identity() {
        assert!(require_identity(Identity::random()).is_ok());
        assert!(require_identity(Identity::new(uuid::Uuid::nil())).is_err());
    }
}
