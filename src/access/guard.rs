//! The permission guard - pure predicates consulted before every read and
//! write whose visibility depends on membership.
//!
//! The guard never touches the store and never mutates state: callers fetch
//! the documents, the guard decides. Each predicate has an `ensure_*`
//! wrapper that signals `Forbidden` for the API-facing paths.

use super::role::{resolve_role, Role};
use crate::domain::{Project, Todo};
use crate::error::CoreError;
use crate::principal::PrincipalId;

/// Any member (owner, editor, or viewer) may read a project.
pub fn can_read(principal: &PrincipalId, project: &Project) -> bool {
    resolve_role(principal, project) != Role::None
}

/// Owners and editors may modify a project's fields.
pub fn can_edit_project(principal: &PrincipalId, project: &Project) -> bool {
    matches!(
        resolve_role(principal, project),
        Role::Owner | Role::Editor
    )
}

/// Only the owner manages the collaborator list and invitations.
pub fn can_manage_collaborators(principal: &PrincipalId, project: &Project) -> bool {
    resolve_role(principal, project) == Role::Owner
}

/// Only the owner may delete a project.
pub fn can_delete_project(principal: &PrincipalId, project: &Project) -> bool {
    resolve_role(principal, project) == Role::Owner
}

/// Mutating a todo inside a project requires edit rights on that project.
/// A project-less todo is mutable by its owner alone; there is no
/// project-level escape hatch. `project` is the todo's project, if the todo
/// has one and it still resolves; a dangling project reference falls back
/// to the owner check.
pub fn can_mutate_todo(principal: &PrincipalId, todo: &Todo, project: Option<&Project>) -> bool {
    match (&todo.project, project) {
        (Some(_), Some(project)) => can_edit_project(principal, project),
        _ => &todo.owner == principal,
    }
}

/// Commenting mirrors mutation: viewers may read a todo but never write
/// comments on it.
pub fn can_comment_on_todo(principal: &PrincipalId, todo: &Todo, project: Option<&Project>) -> bool {
    can_mutate_todo(principal, todo, project)
}

/// Reading a todo inside a project is open to any member; a project-less
/// todo is visible to its owner alone.
pub fn can_read_todo(principal: &PrincipalId, todo: &Todo, project: Option<&Project>) -> bool {
    match (&todo.project, project) {
        (Some(_), Some(project)) => can_read(principal, project),
        _ => &todo.owner == principal,
    }
}

pub fn ensure_read(principal: &PrincipalId, project: &Project) -> Result<(), CoreError> {
    if can_read(principal, project) {
        Ok(())
    } else {
        Err(CoreError::Forbidden {
            action: "read project",
        })
    }
}

pub fn ensure_edit_project(principal: &PrincipalId, project: &Project) -> Result<(), CoreError> {
    if can_edit_project(principal, project) {
        Ok(())
    } else {
        Err(CoreError::Forbidden {
            action: "edit project",
        })
    }
}

pub fn ensure_manage_collaborators(
    principal: &PrincipalId,
    project: &Project,
) -> Result<(), CoreError> {
    if can_manage_collaborators(principal, project) {
        Ok(())
    } else {
        Err(CoreError::Forbidden {
            action: "manage collaborators",
        })
    }
}

pub fn ensure_delete_project(principal: &PrincipalId, project: &Project) -> Result<(), CoreError> {
    if can_delete_project(principal, project) {
        Ok(())
    } else {
        Err(CoreError::Forbidden {
            action: "delete project",
        })
    }
}

pub fn ensure_mutate_todo(
    principal: &PrincipalId,
    todo: &Todo,
    project: Option<&Project>,
) -> Result<(), CoreError> {
    if can_mutate_todo(principal, todo, project) {
        Ok(())
    } else {
        Err(CoreError::Forbidden {
            action: "modify todo",
        })
    }
}

pub fn ensure_comment_on_todo(
    principal: &PrincipalId,
    todo: &Todo,
    project: Option<&Project>,
) -> Result<(), CoreError> {
    if can_comment_on_todo(principal, todo, project) {
        Ok(())
    } else {
        Err(CoreError::Forbidden {
            action: "comment on todo",
        })
    }
}

pub fn ensure_read_todo(
    principal: &PrincipalId,
    todo: &Todo,
    project: Option<&Project>,
) -> Result<(), CoreError> {
    if can_read_todo(principal, todo, project) {
        Ok(())
    } else {
        Err(CoreError::Forbidden { action: "read todo" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CollaboratorRole, NewProject, NewTodo};

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

    fn todo_in(project: &Project) -> Todo {
        Todo::create(
            PrincipalId::from("ed"),
            NewTodo {
                title: "Task".into(),
                ..Default::default()
            },
            Some(project.id.clone()),
        )
    }

    #[test]
    fn read_requires_membership() {
        let p = project();
        assert!(can_read(&PrincipalId::from("owner"), &p));
        assert!(can_read(&PrincipalId::from("vi"), &p));
        assert!(!can_read(&PrincipalId::from("nobody"), &p));
    }

    #[test]
    fn edit_excludes_viewers() {
        let p = project();
        assert!(can_edit_project(&PrincipalId::from("owner"), &p));
        assert!(can_edit_project(&PrincipalId::from("ed"), &p));
        assert!(!can_edit_project(&PrincipalId::from("vi"), &p));
    }

    #[test]
    fn owner_only_capabilities() {
        let p = project();
        for user in ["ed", "vi", "nobody"] {
            assert!(!can_manage_collaborators(&PrincipalId::from(user), &p));
            assert!(!can_delete_project(&PrincipalId::from(user), &p));
        }
        assert!(can_manage_collaborators(&PrincipalId::from("owner"), &p));
        assert!(can_delete_project(&PrincipalId::from("owner"), &p));
    }

    #[test]
    fn project_todo_mutable_by_editors_not_viewers() {
        let p = project();
        let t = todo_in(&p);

        assert!(can_mutate_todo(&PrincipalId::from("owner"), &t, Some(&p)));
        assert!(can_mutate_todo(&PrincipalId::from("ed"), &t, Some(&p)));
        assert!(!can_mutate_todo(&PrincipalId::from("vi"), &t, Some(&p)));
        assert!(!can_mutate_todo(&PrincipalId::from("nobody"), &t, Some(&p)));
    }

    #[test]
    fn project_less_todo_has_no_escape_hatch() {
        let t = Todo::create(
            PrincipalId::from("alice"),
            NewTodo {
                title: "Private".into(),
                ..Default::default()
            },
            None,
        );

        assert!(can_mutate_todo(&PrincipalId::from("alice"), &t, None));
        assert!(can_read_todo(&PrincipalId::from("alice"), &t, None));
        // An editor elsewhere gets nothing here.
        assert!(!can_mutate_todo(&PrincipalId::from("ed"), &t, None));
        assert!(!can_read_todo(&PrincipalId::from("ed"), &t, None));
    }

    #[test]
    fn viewers_read_but_never_comment() {
        let p = project();
        let t = todo_in(&p);

        assert!(can_read_todo(&PrincipalId::from("vi"), &t, Some(&p)));
        assert!(!can_comment_on_todo(&PrincipalId::from("vi"), &t, Some(&p)));
        assert!(can_comment_on_todo(&PrincipalId::from("ed"), &t, Some(&p)));
    }

    #[test]
    fn dangling_project_falls_back_to_todo_owner() {
        let p = project();
        let t = todo_in(&p);

        // Project document gone; only the todo's own creator retains access.
        assert!(can_mutate_todo(&PrincipalId::from("ed"), &t, None));
        assert!(!can_mutate_todo(&PrincipalId::from("owner"), &t, None));
    }

    #[test]
    fn ensure_wrappers_signal_forbidden() {
        let p = project();
        let err = ensure_delete_project(&PrincipalId::from("ed"), &p).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));
        assert!(ensure_read(&PrincipalId::from("vi"), &p).is_ok());
    }
}
