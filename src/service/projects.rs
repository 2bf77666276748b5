use tracing::debug;

use super::CollabCore;
use crate::access::{
    ensure_delete_project, ensure_edit_project, ensure_manage_collaborators, ensure_read,
};
use crate::domain::{
    CollaboratorRole, Document, Invitation, NewProject, Project, ProjectPatch, Todo,
};
use crate::error::CoreError;
use crate::lock::LockManager;
use crate::principal::{Principal, PrincipalId};
use crate::store::DocumentStore;

impl<S: DocumentStore, L: LockManager> CollabCore<S, L> {
    /// Create a project owned by the caller.
    pub fn create_project(
        &self,
        principal: &Principal,
        new: NewProject,
    ) -> Result<Project, CoreError> {
        let project = Project::create(principal.id.clone(), new);
        let saved = self.store().insert(&project)?;
        Ok(saved.data)
    }

    /// Fetch a project the caller is a member of. Runs membership
    /// read-repair before returning.
    pub fn get_project(&self, principal: &Principal, project_id: &str) -> Result<Project, CoreError> {
        let project = self.load::<Project>(project_id)?;
        ensure_read(&principal.id, &project.data)?;
        let (repaired, _) = self.repair_membership(&project)?;
        Ok(repaired)
    }

    /// Every project the caller owns or collaborates on.
    pub fn list_projects(&self, principal: &Principal) -> Result<Vec<Project>, CoreError> {
        let principal_id = principal.id.clone();
        let projects = self.store().find::<Project>(&|project| {
            project.is_owner(&principal_id) || project.collaborator(&principal_id).is_some()
        })?;
        Ok(projects.into_iter().map(|v| v.data).collect())
    }

    /// Apply a partial update. Owners and editors only.
    pub fn update_project(
        &self,
        principal: &Principal,
        project_id: &str,
        patch: ProjectPatch,
    ) -> Result<Project, CoreError> {
        let project = self.load::<Project>(project_id)?;
        ensure_edit_project(&principal.id, &project.data)?;

        let updated = self
            .store()
            .update_where::<Project>(project_id, &|_| true, &|project| project.apply(&patch))?
            .ok_or_else(|| CoreError::not_found::<Project>(project_id))?;
        Ok(updated.data)
    }

    /// Delete a project and everything that hangs off it. Owner only.
    ///
    /// Cascade order: todos first, then the project document, then any
    /// invitations that pointed at it. The store offers no transaction, so
    /// a crash mid-cascade leaves todos already gone and the project still
    /// present; re-running the delete finishes the job.
    pub fn delete_project(&self, principal: &Principal, project_id: &str) -> Result<(), CoreError> {
        let project = self.load::<Project>(project_id)?;
        ensure_delete_project(&principal.id, &project.data)?;

        let todos = self
            .store()
            .find::<Todo>(&|todo| todo.project.as_deref() == Some(project_id))?;
        let cascade = todos.len();
        for todo in &todos {
            self.store().delete::<Todo>(todo.data.id())?;
        }

        self.store().delete::<Project>(project_id)?;

        // Invitations referencing a deleted project are useless either way;
        // removing them is cleanup, not correctness.
        let invitations = self
            .store()
            .find::<Invitation>(&|invitation| invitation.project == project_id)?;
        for invitation in &invitations {
            self.store().delete::<Invitation>(invitation.data.id())?;
        }

        debug!(
            project = project_id,
            todos = cascade,
            invitations = invitations.len(),
            "project deleted with cascade"
        );
        Ok(())
    }

    /// Directly add a collaborator (the invitation-less path used when the
    /// auth layer has already resolved a registered user). Owner only.
    pub fn add_collaborator(
        &self,
        principal: &Principal,
        project_id: &str,
        user: PrincipalId,
        role: CollaboratorRole,
    ) -> Result<Project, CoreError> {
        let project = self.load::<Project>(project_id)?;
        ensure_manage_collaborators(&principal.id, &project.data)?;

        if project.data.is_owner(&user) {
            return Err(CoreError::InvalidState(
                "the owner cannot be added as a collaborator".into(),
            ));
        }
        if project.data.collaborator(&user).is_some() {
            return Err(CoreError::InvalidState(format!(
                "{} is already a collaborator",
                user
            )));
        }

        let mut updated = project.data.clone();
        updated.add_collaborator(user, role);
        let saved = self.store().update(&updated, project.version)?;
        Ok(saved.data)
    }

    /// Remove a collaborator. Owner only.
    pub fn remove_collaborator(
        &self,
        principal: &Principal,
        project_id: &str,
        user: &PrincipalId,
    ) -> Result<Project, CoreError> {
        let project = self.load::<Project>(project_id)?;
        ensure_manage_collaborators(&principal.id, &project.data)?;

        let mut updated = project.data.clone();
        if !updated.remove_collaborator(user) {
            return Err(CoreError::NotFound {
                collection: "collaborators",
                id: user.to_string(),
            });
        }
        let saved = self.store().update(&updated, project.version)?;
        Ok(saved.data)
    }

    /// Change an existing collaborator's role. Owner only.
    pub fn set_collaborator_role(
        &self,
        principal: &Principal,
        project_id: &str,
        user: &PrincipalId,
        role: CollaboratorRole,
    ) -> Result<Project, CoreError> {
        let project = self.load::<Project>(project_id)?;
        ensure_manage_collaborators(&principal.id, &project.data)?;

        let mut updated = project.data.clone();
        if !updated.set_collaborator_role(user, role) {
            return Err(CoreError::NotFound {
                collection: "collaborators",
                id: user.to_string(),
            });
        }
        let saved = self.store().update(&updated, project.version)?;
        Ok(saved.data)
    }
}
