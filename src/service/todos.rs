use tracing::debug;

use super::CollabCore;
use crate::access::{
    ensure_comment_on_todo, ensure_edit_project, ensure_mutate_todo, ensure_read, ensure_read_todo,
};
use crate::domain::{Attachment, Comment, NewTodo, Project, Todo, TodoPatch};
use crate::error::CoreError;
use crate::lock::LockManager;
use crate::principal::Principal;
use crate::store::DocumentStore;

impl<S: DocumentStore, L: LockManager> CollabCore<S, L> {
    /// Create a todo, optionally inside a project the caller may edit.
    ///
    /// The todo document is the dominant write; linking it into the
    /// project's membership cache comes second and is best-effort. A todo
    /// whose cache link never landed is an orphan the read path repairs,
    /// not an error.
    pub fn create_todo(
        &self,
        principal: &Principal,
        new: NewTodo,
        project_id: Option<&str>,
    ) -> Result<Todo, CoreError> {
        if let Some(project_id) = project_id {
            let project = self.load::<Project>(project_id)?;
            ensure_edit_project(&principal.id, &project.data)?;
        }

        let todo = Todo::create(
            principal.id.clone(),
            new,
            project_id.map(|id| id.to_string()),
        );
        let saved = self.store().insert(&todo)?;

        if let Some(project_id) = project_id {
            self.link_todo_best_effort(project_id, &saved.data.id);
        }

        Ok(saved.data)
    }

    /// Fetch a single todo the caller may see.
    pub fn get_todo(&self, principal: &Principal, todo_id: &str) -> Result<Todo, CoreError> {
        let todo = self.load::<Todo>(todo_id)?;
        let project = self.project_of(&todo.data)?;
        ensure_read_todo(&principal.id, &todo.data, project.as_ref().map(|v| &v.data))?;
        Ok(todo.data)
    }

    /// Every todo the caller created.
    pub fn list_todos(&self, principal: &Principal) -> Result<Vec<Todo>, CoreError> {
        let owner = principal.id.clone();
        let todos = self.store().find::<Todo>(&|todo| todo.owner == owner)?;
        Ok(todos.into_iter().map(|v| v.data).collect())
    }

    /// The todos of a project the caller is a member of. This is the
    /// read-repair path: the membership cache is reconciled against the
    /// todo collection before anything is returned.
    pub fn project_todos(
        &self,
        principal: &Principal,
        project_id: &str,
    ) -> Result<Vec<Todo>, CoreError> {
        let project = self.load::<Project>(project_id)?;
        ensure_read(&principal.id, &project.data)?;
        let (_, todos) = self.repair_membership(&project)?;
        Ok(todos)
    }

    /// Apply a partial update to a todo. A patch that moves the todo to a
    /// different project routes through [`reassign_todo`] after the field
    /// update, so the membership sequence keeps its ordering guarantees.
    ///
    /// [`reassign_todo`]: CollabCore::reassign_todo
    pub fn update_todo(
        &self,
        principal: &Principal,
        todo_id: &str,
        patch: TodoPatch,
    ) -> Result<Todo, CoreError> {
        let todo = self.load::<Todo>(todo_id)?;
        let project = self.project_of(&todo.data)?;
        ensure_mutate_todo(&principal.id, &todo.data, project.as_ref().map(|v| &v.data))?;

        let updated = self
            .store()
            .update_where::<Todo>(todo_id, &|_| true, &|todo| todo.apply(&patch))?
            .ok_or_else(|| CoreError::not_found::<Todo>(todo_id))?;

        match &patch.project {
            Some(target) if *target != updated.data.project => {
                self.reassign_todo(principal, todo_id, target.as_deref())
            }
            _ => Ok(updated.data),
        }
    }

    /// Move a todo between projects (either end may be "no project").
    ///
    /// Ordered steps: (1) rewrite `todo.project`, the dominant
    /// last-write-wins write; (2) idempotent add into the new project's
    /// cache; (3) idempotent remove from the old one, skipped when old and
    /// new are the same. Steps 2 and 3 are independently retryable; a crash
    /// between them leaves at most a duplicate reference, never a lost one.
    pub fn reassign_todo(
        &self,
        principal: &Principal,
        todo_id: &str,
        new_project_id: Option<&str>,
    ) -> Result<Todo, CoreError> {
        let todo = self.load::<Todo>(todo_id)?;
        let old_project = self.project_of(&todo.data)?;
        ensure_mutate_todo(
            &principal.id,
            &todo.data,
            old_project.as_ref().map(|v| &v.data),
        )?;

        if let Some(project_id) = new_project_id {
            let target = self.load::<Project>(project_id)?;
            ensure_edit_project(&principal.id, &target.data)?;
        }

        let updated = self
            .store()
            .update_where::<Todo>(todo_id, &|_| true, &|todo| {
                todo.project = new_project_id.map(|id| id.to_string());
                todo.touch();
            })?
            .ok_or_else(|| CoreError::not_found::<Todo>(todo_id))?;

        if let Some(new_id) = new_project_id {
            self.link_todo_best_effort(new_id, todo_id);
        }

        let old_project_id = todo.data.project.as_deref();
        if let Some(old_id) = old_project_id {
            if Some(old_id) != new_project_id {
                self.unlink_todo_best_effort(old_id, todo_id);
            }
        }

        debug!(
            todo = todo_id,
            from = old_project_id.unwrap_or("-"),
            to = new_project_id.unwrap_or("-"),
            "todo reassigned"
        );
        Ok(updated.data)
    }

    /// Delete a todo: the document first, then its cache entry.
    pub fn delete_todo(&self, principal: &Principal, todo_id: &str) -> Result<(), CoreError> {
        let todo = self.load::<Todo>(todo_id)?;
        let project = self.project_of(&todo.data)?;
        ensure_mutate_todo(&principal.id, &todo.data, project.as_ref().map(|v| &v.data))?;

        self.store().delete::<Todo>(todo_id)?;

        if let Some(project_id) = todo.data.project.as_deref() {
            self.unlink_todo_best_effort(project_id, todo_id);
        }
        Ok(())
    }

    /// Add a comment. Commenting needs write-level access: viewers read
    /// the todo but never write to it.
    pub fn add_comment(
        &self,
        principal: &Principal,
        todo_id: &str,
        text: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> Result<Comment, CoreError> {
        let todo = self.load::<Todo>(todo_id)?;
        let project = self.project_of(&todo.data)?;
        ensure_comment_on_todo(&principal.id, &todo.data, project.as_ref().map(|v| &v.data))?;

        let comment = Comment::new(principal.id.clone(), text, attachments);
        self.store()
            .update_where::<Todo>(todo_id, &|_| true, &|todo| {
                todo.push_comment(comment.clone());
            })?
            .ok_or_else(|| CoreError::not_found::<Todo>(todo_id))?;
        Ok(comment)
    }

    pub fn list_comments(
        &self,
        principal: &Principal,
        todo_id: &str,
    ) -> Result<Vec<Comment>, CoreError> {
        let todo = self.load::<Todo>(todo_id)?;
        let project = self.project_of(&todo.data)?;
        ensure_comment_on_todo(&principal.id, &todo.data, project.as_ref().map(|v| &v.data))?;
        Ok(todo.data.comments)
    }

    /// Edit a comment's text. Requires comment access on the todo and
    /// authorship of the comment itself.
    pub fn edit_comment(
        &self,
        principal: &Principal,
        todo_id: &str,
        comment_id: &str,
        text: impl Into<String>,
    ) -> Result<Comment, CoreError> {
        let todo = self.load::<Todo>(todo_id)?;
        let project = self.project_of(&todo.data)?;
        ensure_comment_on_todo(&principal.id, &todo.data, project.as_ref().map(|v| &v.data))?;
        self.ensure_comment_author(&todo.data, comment_id, principal)?;

        let text = text.into();
        let author = principal.id.clone();
        let updated = self
            .store()
            .update_where::<Todo>(
                todo_id,
                // Re-checked inside the document's critical section: the
                // comment may have been deleted or re-authored since the
                // read above.
                &|todo| {
                    todo.comment(comment_id)
                        .map(|c| c.author == author)
                        .unwrap_or(false)
                },
                &|todo| {
                    todo.edit_comment(comment_id, text.clone());
                },
            )?
            .ok_or_else(|| CoreError::NotFound {
                collection: "comments",
                id: comment_id.to_string(),
            })?;

        updated
            .data
            .comment(comment_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                collection: "comments",
                id: comment_id.to_string(),
            })
    }

    /// Delete a comment. Same access rules as editing.
    pub fn delete_comment(
        &self,
        principal: &Principal,
        todo_id: &str,
        comment_id: &str,
    ) -> Result<(), CoreError> {
        let todo = self.load::<Todo>(todo_id)?;
        let project = self.project_of(&todo.data)?;
        ensure_comment_on_todo(&principal.id, &todo.data, project.as_ref().map(|v| &v.data))?;
        self.ensure_comment_author(&todo.data, comment_id, principal)?;

        let author = principal.id.clone();
        self.store()
            .update_where::<Todo>(
                todo_id,
                &|todo| {
                    todo.comment(comment_id)
                        .map(|c| c.author == author)
                        .unwrap_or(false)
                },
                &|todo| {
                    todo.remove_comment(comment_id);
                },
            )?
            .ok_or_else(|| CoreError::NotFound {
                collection: "comments",
                id: comment_id.to_string(),
            })?;
        Ok(())
    }

    fn ensure_comment_author(
        &self,
        todo: &Todo,
        comment_id: &str,
        principal: &Principal,
    ) -> Result<(), CoreError> {
        let comment = todo.comment(comment_id).ok_or_else(|| CoreError::NotFound {
            collection: "comments",
            id: comment_id.to_string(),
        })?;
        if comment.author != principal.id {
            return Err(CoreError::Forbidden {
                action: "modify another author's comment",
            });
        }
        Ok(())
    }
}
