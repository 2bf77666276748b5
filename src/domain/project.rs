use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, Document};
use crate::principal::PrincipalId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// Role granted to a collaborator. The owner is not a collaborator and has
/// no entry in the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorRole {
    Editor,
    Viewer,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub user: PrincipalId,
    pub role: CollaboratorRole,
}

/// A project document.
///
/// `todos` is a denormalized membership cache: the set of todo ids whose
/// `project` field points here. It can drift when a secondary write fails
/// and is reconciled on the read path.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub status: ProjectStatus,
    pub owner: PrincipalId,
    pub collaborators: Vec<Collaborator>,
    pub todos: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by the caller when creating a project.
#[derive(Clone, Debug, Default)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<ProjectStatus>,
}

/// Partial update for a project. `None` leaves the field untouched; the
/// doubled option on `due_date` distinguishes "unchanged" from "cleared".
#[derive(Clone, Debug, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub status: Option<ProjectStatus>,
}

impl Project {
    pub fn create(owner: PrincipalId, new: NewProject) -> Self {
        let now = Utc::now();
        Project {
            id: new_id(),
            name: new.name,
            description: new.description,
            due_date: new.due_date,
            status: new.status.unwrap_or_default(),
            owner,
            collaborators: Vec::new(),
            todos: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owner(&self, user: &PrincipalId) -> bool {
        &self.owner == user
    }

    pub fn collaborator(&self, user: &PrincipalId) -> Option<&Collaborator> {
        self.collaborators.iter().find(|c| &c.user == user)
    }

    /// Add a collaborator. Returns false without touching the list when the
    /// user is the owner or already collaborates; an existing entry keeps
    /// its role.
    pub fn add_collaborator(&mut self, user: PrincipalId, role: CollaboratorRole) -> bool {
        if self.is_owner(&user) || self.collaborator(&user).is_some() {
            return false;
        }
        self.collaborators.push(Collaborator { user, role });
        self.touch();
        true
    }

    /// Remove a collaborator. Returns false if the user was not present.
    pub fn remove_collaborator(&mut self, user: &PrincipalId) -> bool {
        let before = self.collaborators.len();
        self.collaborators.retain(|c| &c.user != user);
        let removed = self.collaborators.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Change an existing collaborator's role. Returns false if the user is
    /// not a collaborator.
    pub fn set_collaborator_role(&mut self, user: &PrincipalId, role: CollaboratorRole) -> bool {
        match self.collaborators.iter_mut().find(|c| &c.user == user) {
            Some(collaborator) => {
                collaborator.role = role;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Idempotent set-add into the membership cache.
    pub fn link_todo(&mut self, todo_id: impl Into<String>) -> bool {
        self.todos.insert(todo_id.into())
    }

    /// Idempotent set-remove from the membership cache.
    pub fn unlink_todo(&mut self, todo_id: &str) -> bool {
        self.todos.remove(todo_id)
    }

    pub fn apply(&mut self, patch: &ProjectPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Document for Project {
    const COLLECTION: &'static str = "projects";

    fn id(&self) -> &str {
        &self.id
    }
}
