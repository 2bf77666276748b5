use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, Document};
use crate::principal::PrincipalId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvitationStatus::Pending => f.write_str("pending"),
            InvitationStatus::Accepted => f.write_str("accepted"),
            InvitationStatus::Rejected => f.write_str("rejected"),
        }
    }
}

/// An invitation to collaborate on a project.
///
/// Lifecycle: `Pending -> Accepted | Rejected`. `Accepted` is terminal.
/// A `Rejected` invitation can be revived to `Pending` in place (re-invite
/// reuses the record instead of minting a new one); the transition methods
/// below are the only place status changes happen.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Invitation {
    pub id: String,
    pub email: String,
    pub project: String,
    pub invited_by: PrincipalId,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub rejected_at: Option<DateTime<Utc>>,
}

/// A status transition was attempted from the wrong state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: InvitationStatus,
    pub attempted: &'static str,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot {} an invitation that is {}",
            self.attempted, self.from
        )
    }
}

impl std::error::Error for InvalidTransition {}

impl Invitation {
    pub fn create(
        email: impl Into<String>,
        project: impl Into<String>,
        invited_by: PrincipalId,
    ) -> Self {
        Invitation {
            id: new_id(),
            email: email.into(),
            project: project.into(),
            invited_by,
            status: InvitationStatus::Pending,
            created_at: Utc::now(),
            rejected_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    /// Whether the invitation targets the given email (case-insensitive).
    pub fn is_for(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }

    pub fn accept(&mut self) -> Result<(), InvalidTransition> {
        if !self.is_pending() {
            return Err(InvalidTransition {
                from: self.status,
                attempted: "accept",
            });
        }
        self.status = InvitationStatus::Accepted;
        Ok(())
    }

    pub fn reject(&mut self) -> Result<(), InvalidTransition> {
        if !self.is_pending() {
            return Err(InvalidTransition {
                from: self.status,
                attempted: "reject",
            });
        }
        self.status = InvitationStatus::Rejected;
        self.rejected_at = Some(Utc::now());
        Ok(())
    }

    /// Move a rejected invitation back to pending, keeping its id. Only the
    /// owner-driven re-invite path calls this.
    pub fn revive(&mut self) -> Result<(), InvalidTransition> {
        if self.status != InvitationStatus::Rejected {
            return Err(InvalidTransition {
                from: self.status,
                attempted: "re-invite",
            });
        }
        self.status = InvitationStatus::Pending;
        self.rejected_at = None;
        Ok(())
    }
}

impl Document for Invitation {
    const COLLECTION: &'static str = "invitations";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation() -> Invitation {
        Invitation::create("a@x.com", "p-1", PrincipalId::from("owner"))
    }

    #[test]
    fn created_pending() {
        let inv = invitation();
        assert!(inv.is_pending());
        assert!(inv.rejected_at.is_none());
    }

    #[test]
    fn accept_is_terminal() {
        let mut inv = invitation();
        inv.accept().unwrap();
        assert_eq!(inv.status, InvitationStatus::Accepted);

        let err = inv.reject().unwrap_err();
        assert_eq!(err.from, InvitationStatus::Accepted);
        assert_eq!(err.to_string(), "cannot reject an invitation that is accepted");

        assert!(inv.accept().is_err());
        assert!(inv.revive().is_err());
    }

    #[test]
    fn reject_then_revive_keeps_id() {
        let mut inv = invitation();
        let id = inv.id.clone();

        inv.reject().unwrap();
        assert!(inv.rejected_at.is_some());

        inv.revive().unwrap();
        assert!(inv.is_pending());
        assert!(inv.rejected_at.is_none());
        assert_eq!(inv.id, id);
    }

    #[test]
    fn revive_requires_rejected() {
        let mut inv = invitation();
        assert!(inv.revive().is_err());
    }

    #[test]
    fn target_email_is_case_insensitive() {
        let inv = invitation();
        assert!(inv.is_for("A@X.com"));
        assert!(!inv.is_for("b@x.com"));
    }
}
