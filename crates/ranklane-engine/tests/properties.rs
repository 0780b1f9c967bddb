//! Invariants checked after sequences of mutations.

mod common;

use common::{create, create_under, school};
use ranklane_engine::{DocumentRef, HierarchyStore, PermissionFacade, can_view};
use ranklane_models::{AccessLevel, Role, UserNode};

fn assert_invariants(hierarchy: &HierarchyStore) {
    assert!(hierarchy.parent_order_holds(), "a parent does not outrank its child");
    assert!(hierarchy.index_is_consistent(), "ancestor index drifted");

    let ids: Vec<_> = hierarchy.nodes().map(|n| n.user_id).collect();
    for a in &ids {
        let descendants: Vec<_> = hierarchy.descendants(*a).collect();
        for b in &ids {
            assert_eq!(
                hierarchy.is_ancestor(*a, *b),
                descendants.contains(b),
                "is_ancestor disagrees with descendants for {a} -> {b}"
            );
        }
    }
}

#[test]
fn test_invariants_hold_after_every_mutation() {
    let engine = PermissionFacade::in_memory();
    let s = school(&engine);
    assert_invariants(&engine.snapshot(s.org).unwrap().hierarchy);

    let second_supervisor = create(&engine, &s.admin, Role::Supervisor, "Sol");
    assert_invariants(&engine.snapshot(s.org).unwrap().hierarchy);

    let teachers: Vec<_> = (0..3)
        .map(|i| create(&engine, &second_supervisor, Role::Teacher, &format!("T{i}")))
        .collect();
    for (i, teacher) in teachers.iter().enumerate() {
        create_under(
            &engine,
            &second_supervisor,
            Role::Student,
            &format!("S{i}"),
            Some(teacher.user_id),
        );
        assert_invariants(&engine.snapshot(s.org).unwrap().hierarchy);
    }

    engine
        .reparent_user(&s.admin, teachers[0].user_id, s.supervisor.user_id)
        .unwrap();
    assert_invariants(&engine.snapshot(s.org).unwrap().hierarchy);

    engine
        .reparent_user(&s.admin, s.student.user_id, teachers[1].user_id)
        .unwrap();
    assert_invariants(&engine.snapshot(s.org).unwrap().hierarchy);

    // Rejected mutations leave the invariants intact as well.
    assert!(
        engine
            .reparent_user(&s.admin, second_supervisor.user_id, teachers[2].user_id)
            .is_err()
    );
    assert_invariants(&engine.snapshot(s.org).unwrap().hierarchy);

    engine.rebuild_hierarchy(&s.admin).unwrap();
    assert_invariants(&engine.snapshot(s.org).unwrap().hierarchy);
}

#[test]
fn test_rebuild_twice_yields_identical_index() {
    let engine = PermissionFacade::in_memory();
    let s = school(&engine);
    create(&engine, &s.supervisor, Role::Teacher, "Ted");

    engine.rebuild_hierarchy(&s.admin).unwrap();
    let first = engine.snapshot(s.org).unwrap().hierarchy.index().edges();
    engine.rebuild_hierarchy(&s.admin).unwrap();
    let second = engine.snapshot(s.org).unwrap().hierarchy.index().edges();

    assert_eq!(first, second);
}

#[test]
fn test_rebuild_with_missing_nodes_keeps_invariants() {
    let engine = PermissionFacade::in_memory();
    let s = school(&engine);
    let snapshot = engine.snapshot(s.org).unwrap();

    let mut hierarchy = snapshot.hierarchy.clone();
    let survivors: Vec<UserNode> = hierarchy
        .nodes()
        .filter(|n| n.user_id != s.supervisor.user_id)
        .cloned()
        .collect();
    let report = hierarchy.rebuild(survivors).unwrap();

    assert_eq!(report.reattached.len(), 2);
    assert!(
        report
            .reattached
            .iter()
            .all(|r| r.new_parent == Some(s.admin.user_id))
    );
    assert_invariants(&hierarchy);
}

#[test]
fn test_hierarchy_visibility_is_monotonic() {
    let engine = PermissionFacade::in_memory();
    let s = school(&engine);
    let extra = create_under(
        &engine,
        &s.supervisor,
        Role::Student,
        "Eve",
        Some(s.teacher.user_id),
    );
    let snapshot = engine.snapshot(s.org).unwrap();
    let hierarchy = &snapshot.hierarchy;

    let actors = [s.admin, s.supervisor, s.teacher, s.student, extra];
    for owner in &actors {
        let doc = DocumentRef {
            owner_id: owner.user_id,
            access_level: AccessLevel::Hierarchy,
            organization_id: s.org,
        };
        for viewer in &actors {
            if hierarchy.is_ancestor(viewer.user_id, owner.user_id) {
                assert!(can_view(hierarchy, viewer, doc));
            }
            if hierarchy.is_ancestor(owner.user_id, viewer.user_id) {
                assert!(!can_view(hierarchy, viewer, doc));
            }
        }
    }
}
