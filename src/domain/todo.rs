use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, Document};
use crate::principal::PrincipalId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub title: String,
    pub completed: bool,
}

/// File attachment metadata on a comment. The blob itself lives in external
/// storage; the core only carries the reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_url: String,
    pub file_name: String,
    pub mimetype: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: PrincipalId,
    pub text: String,
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(author: PrincipalId, text: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Comment {
            id: new_id(),
            author,
            text: text.into(),
            attachments,
            created_at: Utc::now(),
        }
    }
}

/// A todo document.
///
/// `project` is the authoritative side of the todo/project relationship;
/// the project's `todos` cache follows it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub subtasks: Vec<Subtask>,
    pub tags: BTreeSet<String>,
    pub comments: Vec<Comment>,
    pub owner: PrincipalId,
    pub project: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by the caller when creating a todo.
#[derive(Clone, Debug, Default)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub subtasks: Vec<Subtask>,
    pub tags: BTreeSet<String>,
}

/// Partial update for a todo. `project` is carried here for callers that
/// patch everything in one request, but reassignment is applied by the
/// service's membership sequence, not by [`Todo::apply`].
#[derive(Clone, Debug, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub subtasks: Option<Vec<Subtask>>,
    pub tags: Option<BTreeSet<String>>,
    pub project: Option<Option<String>>,
}

impl Todo {
    pub fn create(owner: PrincipalId, new: NewTodo, project: Option<String>) -> Self {
        let now = Utc::now();
        Todo {
            id: new_id(),
            title: new.title,
            description: new.description,
            completed: false,
            due_date: new.due_date,
            subtasks: new.subtasks,
            tags: new.tags,
            comments: Vec::new(),
            owner,
            project,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn comment(&self, comment_id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    pub fn add_comment(
        &mut self,
        author: PrincipalId,
        text: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> Comment {
        let comment = Comment::new(author, text, attachments);
        self.push_comment(comment.clone());
        comment
    }

    /// Append an already-built comment (the service builds the comment
    /// before entering the store's conditional-update closure).
    pub fn push_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
        self.touch();
    }

    /// Update a comment's text. Returns false if the comment is gone.
    pub fn edit_comment(&mut self, comment_id: &str, text: impl Into<String>) -> bool {
        match self.comments.iter_mut().find(|c| c.id == comment_id) {
            Some(comment) => {
                comment.text = text.into();
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Remove a comment. Returns false if the comment is gone.
    pub fn remove_comment(&mut self, comment_id: &str) -> bool {
        let before = self.comments.len();
        self.comments.retain(|c| c.id != comment_id);
        let removed = self.comments.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Apply everything in the patch except `project`; membership moves are
    /// ordered multi-document sequences owned by the service.
    pub fn apply(&mut self, patch: &TodoPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(subtasks) = &patch.subtasks {
            self.subtasks = subtasks.clone();
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Document for Todo {
    const COLLECTION: &'static str = "todos";

    fn id(&self) -> &str {
        &self.id
    }
}
