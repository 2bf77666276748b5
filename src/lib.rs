//! twodo_core - collaboration & authorization core for the twodo task
//! manager.
//!
//! Decides who may read, modify, or delete a project or todo, runs the
//! invitation lifecycle that admits new collaborators, and keeps the
//! many-to-many link between todos and projects consistent over a store
//! that only guarantees atomic single-document writes.

mod access;
mod domain;
mod error;
mod lock;
mod principal;
mod service;
mod store;

pub use access::{
    can_comment_on_todo, can_delete_project, can_edit_project, can_manage_collaborators,
    can_mutate_todo, can_read, can_read_todo, ensure_comment_on_todo, ensure_delete_project,
    ensure_edit_project, ensure_manage_collaborators, ensure_mutate_todo, ensure_read,
    ensure_read_todo, resolve_role, Role,
};
pub use domain::{
    Attachment, Collaborator, CollaboratorRole, Comment, Document, InvalidTransition, Invitation,
    InvitationStatus, NewProject, NewTodo, Project, ProjectPatch, ProjectStatus, Subtask, Todo,
    TodoPatch,
};
pub use error::CoreError;
pub use lock::{InMemoryLock, InMemoryLockManager, Lock, LockError, LockManager};
pub use principal::{Principal, PrincipalId};
pub use service::CollabCore;
pub use store::{DocumentStore, InMemoryStore, StoreError, Versioned};
