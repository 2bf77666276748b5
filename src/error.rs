//! Error types returned to route handlers.

use std::error::Error;
use std::fmt;

use crate::domain::Document;
use crate::lock::LockError;
use crate::store::StoreError;

/// Error type for core operations.
///
/// Every operation returns one of these to its caller; nothing is retried
/// or swallowed inside the core. `NotFound` and `Forbidden` are terminal
/// for the request. `Conflict` means a concurrent writer won a race on a
/// uniqueness or version constraint and the call is safe to retry.
#[derive(Debug)]
pub enum CoreError {
    /// The entity id does not resolve in its collection.
    NotFound { collection: &'static str, id: String },
    /// The caller's role does not permit the attempted action.
    Forbidden { action: &'static str },
    /// An invitation transition was attempted from the wrong state, or an
    /// active invitation already exists for the target.
    InvalidState(String),
    /// A concurrent write lost a race on a uniqueness constraint.
    Conflict(String),
    /// Document store error.
    Store(StoreError),
    /// Lock manager error.
    Lock(LockError),
}

impl CoreError {
    pub(crate) fn not_found<D: Document>(id: impl Into<String>) -> Self {
        CoreError::NotFound {
            collection: D::COLLECTION,
            id: id.into(),
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::NotFound { collection, id } => {
                write!(f, "not found: {}:{}", collection, id)
            }
            CoreError::Forbidden { action } => write!(f, "forbidden: {}", action),
            CoreError::InvalidState(msg) => write!(f, "invalid state: {}", msg),
            CoreError::Conflict(msg) => write!(f, "conflict: {}", msg),
            CoreError::Store(e) => write!(f, "store error: {}", e),
            CoreError::Lock(e) => write!(f, "lock error: {}", e),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CoreError::Store(e) => Some(e),
            CoreError::Lock(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict {
                collection,
                id,
                expected,
                actual,
            } => CoreError::Conflict(format!(
                "concurrent write on {}:{} (expected version {}, actual {})",
                collection, id, expected, actual
            )),
            other => CoreError::Store(other),
        }
    }
}

impl From<LockError> for CoreError {
    fn from(err: LockError) -> Self {
        CoreError::Lock(err)
    }
}

impl From<crate::domain::InvalidTransition> for CoreError {
    fn from(err: crate::domain::InvalidTransition) -> Self {
        CoreError::InvalidState(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Project;

    #[test]
    fn display_messages() {
        let not_found = CoreError::NotFound {
            collection: "projects",
            id: "p-1".into(),
        };
        assert_eq!(not_found.to_string(), "not found: projects:p-1");

        let forbidden = CoreError::Forbidden {
            action: "delete project",
        };
        assert_eq!(forbidden.to_string(), "forbidden: delete project");

        let invalid = CoreError::InvalidState("invitation already accepted".into());
        assert_eq!(
            invalid.to_string(),
            "invalid state: invitation already accepted"
        );
    }

    #[test]
    fn not_found_uses_document_collection() {
        let err = CoreError::not_found::<Project>("p-9");
        assert!(matches!(
            err,
            CoreError::NotFound {
                collection: "projects",
                ..
            }
        ));
    }

    #[test]
    fn store_conflict_maps_to_core_conflict() {
        let err: CoreError = StoreError::Conflict {
            collection: "invitations".into(),
            id: "i-1".into(),
            expected: 1,
            actual: 2,
        }
        .into();

        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn store_storage_error_passes_through() {
        let err: CoreError = StoreError::Storage("lock poisoned".into()).into();
        assert!(matches!(err, CoreError::Store(_)));
    }
}
