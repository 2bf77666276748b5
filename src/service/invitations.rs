//! The invitation state machine: `pending -> accepted | rejected`, with
//! owner-driven revival of rejected invitations.

use tracing::debug;

use super::CollabCore;
use crate::access::ensure_manage_collaborators;
use crate::domain::{Invitation, InvitationStatus, Project};
use crate::error::CoreError;
use crate::lock::{Lock, LockManager};
use crate::principal::Principal;
use crate::store::DocumentStore;

impl<S: DocumentStore, L: LockManager> CollabCore<S, L> {
    /// Invite an email address to collaborate on a project. Owner only.
    ///
    /// At most one pending invitation may exist per (email, project). The
    /// store has no uniqueness constraint to lean on, so the check-then-
    /// insert runs inside a critical section serialized per (project,
    /// email) key; an insert that still collides (a racing writer on a
    /// different core instance) surfaces the store's conflict.
    pub fn invite(
        &self,
        principal: &Principal,
        project_id: &str,
        email: &str,
    ) -> Result<Invitation, CoreError> {
        let project = self.load::<Project>(project_id)?;
        ensure_manage_collaborators(&principal.id, &project.data)?;

        let email = email.trim();
        let key = format!("{}:{}", project_id, email.to_lowercase());
        let lock = self.invite_locks().get_lock(&key)?;
        lock.lock()?;
        let result = self.invite_locked(principal, project_id, email);
        lock.unlock()?;
        result
    }

    fn invite_locked(
        &self,
        principal: &Principal,
        project_id: &str,
        email: &str,
    ) -> Result<Invitation, CoreError> {
        let existing = self
            .store()
            .find::<Invitation>(&|invitation| {
                invitation.project == project_id && invitation.is_for(email)
            })?
            .into_iter()
            .next();

        match existing {
            Some(invitation) => match invitation.data.status {
                InvitationStatus::Pending | InvitationStatus::Accepted => {
                    Err(CoreError::InvalidState(format!(
                        "an invitation for {} is already {}",
                        email, invitation.data.status
                    )))
                }
                InvitationStatus::Rejected => {
                    // Revive in place: same record, same id.
                    let mut revived = invitation.data.clone();
                    revived.revive()?;
                    let saved = self.store().update(&revived, invitation.version)?;
                    debug!(invitation = saved.data.id.as_str(), "rejected invitation revived");
                    Ok(saved.data)
                }
            },
            None => {
                let invitation =
                    Invitation::create(email, project_id, principal.id.clone());
                let saved = self.store().insert(&invitation)?;
                Ok(saved.data)
            }
        }
    }

    /// Accept a pending invitation addressed to the caller's email.
    ///
    /// The collaborator insert comes before the status flip: if the flip
    /// never lands, the invitation stays pending and a retried accept
    /// completes it; the insert is idempotent, so nothing duplicates. The
    /// reverse order would strand an accepted invitation with no
    /// collaborator and no way to retry.
    pub fn accept(&self, principal: &Principal, invitation_id: &str) -> Result<Project, CoreError> {
        let invitation = self.load::<Invitation>(invitation_id)?;
        if !invitation.data.is_for(&principal.email) {
            return Err(CoreError::Forbidden {
                action: "accept an invitation addressed to someone else",
            });
        }

        let mut accepted = invitation.data.clone();
        accepted.accept()?;

        let role = self.default_role();
        let principal_id = principal.id.clone();
        let project = self
            .store()
            .update_where::<Project>(&accepted.project, &|_| true, &|project| {
                // No-op for the owner or an existing collaborator; an
                // editor is never downgraded to the default role.
                project.add_collaborator(principal_id.clone(), role);
            })?
            .ok_or_else(|| CoreError::not_found::<Project>(accepted.project.as_str()))?;

        self.store().update(&accepted, invitation.version)?;
        debug!(
            invitation = invitation_id,
            project = accepted.project.as_str(),
            "invitation accepted"
        );
        Ok(project.data)
    }

    /// Reject a pending invitation addressed to the caller's email. No
    /// project mutation.
    pub fn reject(
        &self,
        principal: &Principal,
        invitation_id: &str,
    ) -> Result<Invitation, CoreError> {
        let invitation = self.load::<Invitation>(invitation_id)?;
        if !invitation.data.is_for(&principal.email) {
            return Err(CoreError::Forbidden {
                action: "reject an invitation addressed to someone else",
            });
        }

        let mut rejected = invitation.data.clone();
        rejected.reject()?;
        let saved = self.store().update(&rejected, invitation.version)?;
        Ok(saved.data)
    }

    /// Pending invitations addressed to the caller's email.
    pub fn invitations_for(&self, principal: &Principal) -> Result<Vec<Invitation>, CoreError> {
        let email = principal.email.clone();
        let invitations = self
            .store()
            .find::<Invitation>(&|invitation| invitation.is_pending() && invitation.is_for(&email))?;
        Ok(invitations.into_iter().map(|v| v.data).collect())
    }

    /// Invitations the caller has sent, in any state.
    pub fn invitations_by(&self, principal: &Principal) -> Result<Vec<Invitation>, CoreError> {
        let inviter = principal.id.clone();
        let invitations = self
            .store()
            .find::<Invitation>(&|invitation| invitation.invited_by == inviter)?;
        Ok(invitations.into_iter().map(|v| v.data).collect())
    }
}
