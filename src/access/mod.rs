//! Access control - role resolution and the permission guard.
//!
//! Single authorization authority for the core: every entry point (route
//! handler, background job, test) decides permissions through this module
//! and nowhere else.

mod guard;
mod role;

pub use guard::{
    can_comment_on_todo, can_delete_project, can_edit_project, can_manage_collaborators,
    can_mutate_todo, can_read, can_read_todo, ensure_comment_on_todo, ensure_delete_project,
    ensure_edit_project, ensure_manage_collaborators, ensure_mutate_todo, ensure_read,
    ensure_read_todo,
};
pub use role::{resolve_role, Role};
