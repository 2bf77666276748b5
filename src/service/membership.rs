//! Membership synchronization between `Todo.project` and `Project.todos`.
//!
//! The store writes one document at a time, so the cache on the project
//! side can drift from the todo side. Every sequence here orders its steps
//! insert-before-remove: a crash mid-sequence leaves at most a duplicate
//! reference (self-healing on the next read) and never a lost one. Cache
//! writes are best-effort once the dominant todo write has landed.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::CollabCore;
use crate::domain::{Project, Todo};
use crate::error::CoreError;
use crate::lock::LockManager;
use crate::store::{DocumentStore, StoreError, Versioned};

impl<S: DocumentStore, L: LockManager> CollabCore<S, L> {
    /// Idempotent set-add of a todo id into a project's membership cache.
    /// Returns false when the project no longer exists.
    pub(crate) fn link_todo_in_cache(
        &self,
        project_id: &str,
        todo_id: &str,
    ) -> Result<bool, CoreError> {
        let updated = self.store().update_where::<Project>(
            project_id,
            &|_| true,
            &|project| {
                project.link_todo(todo_id);
            },
        )?;
        Ok(updated.is_some())
    }

    /// Idempotent set-remove of a todo id from a project's membership
    /// cache. Returns false when the project no longer exists.
    pub(crate) fn unlink_todo_in_cache(
        &self,
        project_id: &str,
        todo_id: &str,
    ) -> Result<bool, CoreError> {
        let updated = self.store().update_where::<Project>(
            project_id,
            &|_| true,
            &|project| {
                project.unlink_todo(todo_id);
            },
        )?;
        Ok(updated.is_some())
    }

    /// Cache add after the dominant todo write. Failure leaves the todo in
    /// a recoverable orphaned state that the read path repairs.
    pub(crate) fn link_todo_best_effort(&self, project_id: &str, todo_id: &str) {
        match self.link_todo_in_cache(project_id, todo_id) {
            Ok(true) => {}
            Ok(false) => debug!(
                project = project_id,
                todo = todo_id,
                "membership cache add skipped: project missing"
            ),
            Err(err) => warn!(
                project = project_id,
                todo = todo_id,
                error = %err,
                "membership cache add failed; read-repair will reconcile"
            ),
        }
    }

    pub(crate) fn unlink_todo_best_effort(&self, project_id: &str, todo_id: &str) {
        match self.unlink_todo_in_cache(project_id, todo_id) {
            Ok(true) => {}
            Ok(false) => debug!(
                project = project_id,
                todo = todo_id,
                "membership cache remove skipped: project missing"
            ),
            Err(err) => warn!(
                project = project_id,
                todo = todo_id,
                error = %err,
                "membership cache remove failed; read-repair will reconcile"
            ),
        }
    }

    /// Lazy read-repair: reconcile a project's membership cache against the
    /// todo collection's ground truth (every todo whose `project` field
    /// points here). Returns the repaired project plus its todos.
    ///
    /// The repaired cache is written back with an optimistic update; losing
    /// that race means a concurrent writer owns the document, so the write
    /// is skipped and the next read repairs instead. This runs on the read
    /// path, not in a background job, so the core stays stateless.
    pub(crate) fn repair_membership(
        &self,
        project: &Versioned<Project>,
    ) -> Result<(Project, Vec<Todo>), CoreError> {
        let project_id = project.data.id.as_str();
        let members = self
            .store()
            .find::<Todo>(&|todo| todo.project.as_deref() == Some(project_id))?;

        let truth: BTreeSet<String> = members.iter().map(|v| v.data.id.clone()).collect();
        let todos: Vec<Todo> = members.into_iter().map(|v| v.data).collect();

        if truth == project.data.todos {
            return Ok((project.data.clone(), todos));
        }

        let mut repaired = project.data.clone();
        repaired.todos = truth;

        match self.store().update(&repaired, project.version) {
            Ok(_) => debug!(project = project_id, "membership cache repaired"),
            Err(StoreError::Conflict { .. }) => {
                // A concurrent writer owns the document; the next read
                // repairs.
                debug!(project = project_id, "membership repair skipped: version moved")
            }
            Err(err) => warn!(
                project = project_id,
                error = %err,
                "membership repair write failed"
            ),
        }

        Ok((repaired, todos))
    }
}
