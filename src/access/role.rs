use serde::{Deserialize, Serialize};

use crate::domain::{CollaboratorRole, Project};
use crate::principal::PrincipalId;

/// The caller's effective authorization level for a project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Editor,
    Viewer,
    None,
}

impl From<CollaboratorRole> for Role {
    fn from(role: CollaboratorRole) -> Self {
        match role {
            CollaboratorRole::Editor => Role::Editor,
            CollaboratorRole::Viewer => Role::Viewer,
        }
    }
}

/// Compute a principal's effective role on a project.
///
/// Owner match first, then a scan of the collaborator list, else `None`.
/// Pure and deterministic; O(collaborators).
pub fn resolve_role(principal: &PrincipalId, project: &Project) -> Role {
    if project.is_owner(principal) {
        return Role::Owner;
    }
    match project.collaborator(principal) {
        Some(collaborator) => collaborator.role.into(),
        None => Role::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewProject;

    fn project() -> Project {
        let mut p = Project::create(
            PrincipalId::from("owner"),
            NewProject {
                name: "Launch".into(),
                ..Default::default()
            },
        );
        p.add_collaborator(PrincipalId::from("ed"), CollaboratorRole::Editor);
        p.add_collaborator(PrincipalId::from("vi"), CollaboratorRole::Viewer);
        p
    }

    #[test]
    fn resolves_each_role() {
        let p = project();
        assert_eq!(resolve_role(&PrincipalId::from("owner"), &p), Role::Owner);
        assert_eq!(resolve_role(&PrincipalId::from("ed"), &p), Role::Editor);
        assert_eq!(resolve_role(&PrincipalId::from("vi"), &p), Role::Viewer);
        assert_eq!(resolve_role(&PrincipalId::from("nobody"), &p), Role::None);
    }

    #[test]
    fn deterministic_across_calls() {
        let p = project();
        let first = resolve_role(&PrincipalId::from("ed"), &p);
        let second = resolve_role(&PrincipalId::from("ed"), &p);
        assert_eq!(first, second);
    }
}
