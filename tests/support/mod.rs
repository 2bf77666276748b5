#![allow(dead_code)]

use twodo_core::{
    CollabCore, CollaboratorRole, InMemoryStore, NewProject, NewTodo, Principal, Project, Todo,
};

/// Opt-in log capture: run with RUST_LOG=debug to watch the service layer.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn core() -> CollabCore<InMemoryStore> {
    init_tracing();
    CollabCore::new(InMemoryStore::new())
}

pub fn owner() -> Principal {
    Principal::new("user-owner", "owner@x.com")
}

pub fn alice() -> Principal {
    Principal::new("user-alice", "a@x.com")
}

pub fn bob() -> Principal {
    Principal::new("user-bob", "b@x.com")
}

pub fn carol() -> Principal {
    Principal::new("user-carol", "c@x.com")
}

pub fn project(core: &CollabCore<InMemoryStore>, principal: &Principal, name: &str) -> Project {
    core.create_project(
        principal,
        NewProject {
            name: name.into(),
            ..Default::default()
        },
    )
    .expect("create project")
}

pub fn todo(
    core: &CollabCore<InMemoryStore>,
    principal: &Principal,
    title: &str,
    project_id: Option<&str>,
) -> Todo {
    core.create_todo(
        principal,
        NewTodo {
            title: title.into(),
            ..Default::default()
        },
        project_id,
    )
    .expect("create todo")
}

pub fn add_editor(
    core: &CollabCore<InMemoryStore>,
    owner: &Principal,
    project_id: &str,
    user: &Principal,
) {
    core.add_collaborator(
        owner,
        project_id,
        user.id.clone(),
        CollaboratorRole::Editor,
    )
    .expect("add editor");
}

pub fn add_viewer(
    core: &CollabCore<InMemoryStore>,
    owner: &Principal,
    project_id: &str,
    user: &Principal,
) {
    core.add_collaborator(
        owner,
        project_id,
        user.id.clone(),
        CollaboratorRole::Viewer,
    )
    .expect("add viewer");
}
