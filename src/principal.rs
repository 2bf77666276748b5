//! Authenticated caller context.
//!
//! Route handlers authenticate a request and hand the core a [`Principal`]:
//! the caller's opaque [`PrincipalId`] plus the email they registered with.
//! The id identifies the user inside stored documents (owner, collaborator,
//! inviter); the email is the address invitations are sent to.

use serde::{Deserialize, Serialize};

/// Opaque, stable identifier for a user.
///
/// Comparisons are exact; the auth layer resolves external identities (emails,
/// session tokens) to this id before the core ever sees it. Ids travel inside
/// stored documents, so the newtype is serializable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Borrow the underlying identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PrincipalId {
    fn from(value: &str) -> Self {
        PrincipalId(value.to_string())
    }
}

impl From<String> for PrincipalId {
    fn from(value: String) -> Self {
        PrincipalId(value)
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated caller: a stable id plus the email they registered with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    /// Stable identity used inside stored documents.
    pub id: PrincipalId,
    /// Registered email; invitations are addressed to this value.
    pub email: String,
}

impl Principal {
    /// Build a principal from an id and a registered email.
    pub fn new(id: impl Into<PrincipalId>, email: impl Into<String>) -> Self {
        Principal {
            id: id.into(),
            email: email.into(),
        }
    }
}
