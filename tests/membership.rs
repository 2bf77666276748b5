mod support;

use support::{add_editor, alice, bob, core, owner, project, todo};
use twodo_core::{CoreError, DocumentStore, Project, Todo, TodoPatch};

#[test]
fn created_todo_lands_in_the_membership_cache() {
    let core = core();
    let owner = owner();
    let p = project(&core, &owner, "Launch");

    let t = todo(&core, &owner, "Ship it", Some(p.id.as_str()));
    assert_eq!(t.project.as_deref(), Some(p.id.as_str()));

    let fetched = core.get_project(&owner, &p.id).unwrap();
    assert!(fetched.todos.contains(&t.id));
}

#[test]
fn reassign_moves_the_todo_between_caches() {
    let core = core();
    let owner = owner();
    let alice = alice();

    let p = project(&core, &owner, "P");
    let q = project(&core, &owner, "Q");
    add_editor(&core, &owner, &p.id, &alice);
    add_editor(&core, &owner, &q.id, &alice);

    let t = todo(&core, &owner, "Migrating task", Some(p.id.as_str()));

    // An editor of both ends performs the move.
    let moved = core.reassign_todo(&alice, &t.id, Some(q.id.as_str())).unwrap();
    assert_eq!(moved.project.as_deref(), Some(q.id.as_str()));

    let p_after = core.get_project(&owner, &p.id).unwrap();
    let q_after = core.get_project(&owner, &q.id).unwrap();
    assert!(!p_after.todos.contains(&t.id));
    assert!(q_after.todos.contains(&t.id));
}

#[test]
fn reassign_to_no_project_detaches() {
    let core = core();
    let owner = owner();
    let p = project(&core, &owner, "P");
    let t = todo(&core, &owner, "Detach me", Some(p.id.as_str()));

    let detached = core.reassign_todo(&owner, &t.id, None).unwrap();
    assert!(detached.project.is_none());

    let p_after = core.get_project(&owner, &p.id).unwrap();
    assert!(!p_after.todos.contains(&t.id));
}

#[test]
fn reassign_requires_edit_rights_on_the_target() {
    let core = core();
    let owner = owner();
    let bob = bob();

    let theirs = project(&core, &owner, "Theirs");
    let mine = project(&core, &bob, "Mine");
    let t = todo(&core, &bob, "Sneak in", Some(mine.id.as_str()));

    let err = core.reassign_todo(&bob, &t.id, Some(theirs.id.as_str())).unwrap_err();
    assert!(matches!(err, CoreError::Forbidden { .. }));
}

#[test]
fn reassign_to_same_project_is_a_no_op_move() {
    let core = core();
    let owner = owner();
    let p = project(&core, &owner, "P");
    let t = todo(&core, &owner, "Stay put", Some(p.id.as_str()));

    let moved = core.reassign_todo(&owner, &t.id, Some(p.id.as_str())).unwrap();
    assert_eq!(moved.project.as_deref(), Some(p.id.as_str()));

    let p_after = core.get_project(&owner, &p.id).unwrap();
    assert!(p_after.todos.contains(&t.id));
}

#[test]
fn patch_with_project_change_routes_through_reassignment() {
    let core = core();
    let owner = owner();
    let p = project(&core, &owner, "P");
    let q = project(&core, &owner, "Q");
    let t = todo(&core, &owner, "Patched move", Some(p.id.as_str()));

    let updated = core
        .update_todo(
            &owner,
            &t.id,
            TodoPatch {
                title: Some("Patched and moved".into()),
                project: Some(Some(q.id.clone())),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.title, "Patched and moved");
    assert_eq!(updated.project.as_deref(), Some(q.id.as_str()));

    let p_after = core.get_project(&owner, &p.id).unwrap();
    let q_after = core.get_project(&owner, &q.id).unwrap();
    assert!(!p_after.todos.contains(&t.id));
    assert!(q_after.todos.contains(&t.id));
}

#[test]
fn deleting_a_todo_clears_its_cache_entry() {
    let core = core();
    let owner = owner();
    let p = project(&core, &owner, "P");
    let t = todo(&core, &owner, "Short-lived", Some(p.id.as_str()));

    core.delete_todo(&owner, &t.id).unwrap();

    assert!(matches!(
        core.get_todo(&owner, &t.id).unwrap_err(),
        CoreError::NotFound { .. }
    ));
    let p_after = core.get_project(&owner, &p.id).unwrap();
    assert!(!p_after.todos.contains(&t.id));
}

#[test]
fn deleting_a_project_cascades_to_its_todos() {
    let core = core();
    let owner = owner();
    let p = project(&core, &owner, "Doomed");
    let t1 = todo(&core, &owner, "Goes down with the ship", Some(p.id.as_str()));
    let t2 = todo(&core, &owner, "Also doomed", Some(p.id.as_str()));
    let survivor = todo(&core, &owner, "Unrelated", None);

    core.delete_project(&owner, &p.id).unwrap();

    assert!(core.store().get::<Project>(&p.id).unwrap().is_none());
    assert!(core.store().get::<Todo>(&t1.id).unwrap().is_none());
    assert!(core.store().get::<Todo>(&t2.id).unwrap().is_none());
    assert!(core.store().get::<Todo>(&survivor.id).unwrap().is_some());
}

#[test]
fn read_repair_drops_stale_cache_entries() {
    let core = core();
    let owner = owner();
    let p = project(&core, &owner, "Drifting");
    let t = todo(&core, &owner, "Real member", Some(p.id.as_str()));

    // Simulate cache drift from a half-finished sequence: a stale id that
    // no longer points back, alongside the legitimate entry.
    let mut drifted = core.store().get::<Project>(&p.id).unwrap().unwrap().data;
    drifted.todos.insert("todo-that-moved-away".into());
    core.store().put(&drifted).unwrap();

    let repaired = core.get_project(&owner, &p.id).unwrap();
    assert!(repaired.todos.contains(&t.id));
    assert!(!repaired.todos.contains("todo-that-moved-away"));

    // The repair was written back, not just served.
    let persisted = core.store().get::<Project>(&p.id).unwrap().unwrap().data;
    assert!(!persisted.todos.contains("todo-that-moved-away"));
}

#[test]
fn read_repair_restores_orphaned_todos() {
    let core = core();
    let owner = owner();
    let p = project(&core, &owner, "Forgetful");
    let t = todo(&core, &owner, "Orphan", Some(p.id.as_str()));

    // Simulate the cache add never landing: the todo points at the project
    // but the project has forgotten it.
    let mut drifted = core.store().get::<Project>(&p.id).unwrap().unwrap().data;
    drifted.todos.remove(&t.id);
    core.store().put(&drifted).unwrap();

    let todos = core.project_todos(&owner, &p.id).unwrap();
    assert!(todos.iter().any(|todo| todo.id == t.id));

    let repaired = core.get_project(&owner, &p.id).unwrap();
    assert!(repaired.todos.contains(&t.id));
}

#[test]
fn no_todo_is_cached_by_two_projects_after_moves() {
    let core = core();
    let owner = owner();
    let p = project(&core, &owner, "A");
    let q = project(&core, &owner, "B");
    let r = project(&core, &owner, "C");
    let t = todo(&core, &owner, "Wanderer", Some(p.id.as_str()));

    core.reassign_todo(&owner, &t.id, Some(q.id.as_str())).unwrap();
    core.reassign_todo(&owner, &t.id, Some(r.id.as_str())).unwrap();

    let caches = [
        core.get_project(&owner, &p.id).unwrap(),
        core.get_project(&owner, &q.id).unwrap(),
        core.get_project(&owner, &r.id).unwrap(),
    ];
    let holders: Vec<_> = caches
        .iter()
        .filter(|project| project.todos.contains(&t.id))
        .collect();
    assert_eq!(holders.len(), 1);
    assert_eq!(holders[0].id, r.id);
}
