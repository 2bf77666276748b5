//! CollabCore - the operation surface consumed by route handlers.
//!
//! Route handlers supply an authenticated [`Principal`](crate::Principal)
//! and operation
//! parameters; the service resolves roles, guards the operation, and
//! applies side effects against the document store. Multi-document
//! sequences (membership moves, invitation acceptance) are ordered so that
//! every step is idempotent and a crash between steps leaves only
//! self-healing drift, never loss.

mod invitations;
mod membership;
mod projects;
mod todos;

use crate::access::{resolve_role, Role};
use crate::domain::{CollaboratorRole, Document, Project, Todo};
use crate::error::CoreError;
use crate::lock::{InMemoryLockManager, LockManager};
use crate::principal::PrincipalId;
use crate::store::{DocumentStore, Versioned};

/// The collaboration & authorization core.
///
/// Generic over the document store and the lock manager guarding the
/// invitation uniqueness critical section.
pub struct CollabCore<S: DocumentStore, L: LockManager = InMemoryLockManager> {
    store: S,
    invite_locks: L,
    default_role: CollaboratorRole,
}

impl<S: DocumentStore> CollabCore<S> {
    pub fn new(store: S) -> Self {
        CollabCore::with_lock_manager(store, InMemoryLockManager::new())
    }
}

impl<S: DocumentStore, L: LockManager> CollabCore<S, L> {
    pub fn with_lock_manager(store: S, invite_locks: L) -> Self {
        CollabCore {
            store,
            invite_locks,
            default_role: CollaboratorRole::Viewer,
        }
    }

    /// Role granted to a principal accepting an invitation. Defaults to
    /// `Viewer`, the least-privilege choice.
    pub fn with_default_role(mut self, role: CollaboratorRole) -> Self {
        self.default_role = role;
        self
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Compute a principal's effective role on a project.
    pub fn resolve_role(
        &self,
        principal: &PrincipalId,
        project_id: &str,
    ) -> Result<Role, CoreError> {
        let project = self.load::<Project>(project_id)?;
        Ok(resolve_role(principal, &project.data))
    }

    pub(crate) fn load<D: Document>(&self, id: &str) -> Result<Versioned<D>, CoreError> {
        self.store
            .get::<D>(id)?
            .ok_or_else(|| CoreError::not_found::<D>(id))
    }

    /// Fetch a todo's project document, tolerating a dangling reference
    /// (the project may have been deleted between writes).
    pub(crate) fn project_of(&self, todo: &Todo) -> Result<Option<Versioned<Project>>, CoreError> {
        match &todo.project {
            Some(project_id) => Ok(self.store.get::<Project>(project_id)?),
            None => Ok(None),
        }
    }

    pub(crate) fn default_role(&self) -> CollaboratorRole {
        self.default_role
    }

    pub(crate) fn invite_locks(&self) -> &L {
        &self.invite_locks
    }
}
