//! Domain documents - the typed records persisted by the document store.
//!
//! Each document lives in its own collection and is mutated through methods
//! that keep the record's local invariants intact; cross-document invariants
//! (todo/project membership, invitation uniqueness) are the service layer's
//! job because the store only writes one document atomically.

mod invitation;
mod project;
mod todo;

use serde::{de::DeserializeOwned, Serialize};

/// Trait for types persisted by a [`DocumentStore`](crate::DocumentStore).
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The collection name for this document type (e.g. "projects").
    /// Maps to a table in SQL, a collection in MongoDB, a key prefix in KV
    /// stores, etc.
    const COLLECTION: &'static str;

    /// Returns the unique identifier for this document.
    fn id(&self) -> &str;
}

/// Mint a fresh document id.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub use invitation::{InvalidTransition, Invitation, InvitationStatus};
pub use project::{Collaborator, CollaboratorRole, NewProject, Project, ProjectPatch, ProjectStatus};
pub use todo::{Attachment, Comment, NewTodo, Subtask, Todo, TodoPatch};
