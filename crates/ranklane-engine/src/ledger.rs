//! Class/assignment ledger.
//!
//! Classes bind one teacher, the teacher's supervising ancestor, a set of
//! students from the same branch, and an optional prompt. Scope checks are
//! evaluated against the hierarchy passed in, which is always the snapshot
//! being mutated.

use std::collections::{BTreeSet, HashMap};

use metrics::counter;
use ranklane_models::{Actor, ClassAssignment, ClassId, PromptId, Role, UserId};

use crate::error::EngineError;
use crate::hierarchy::HierarchyStore;

#[derive(Debug, Clone, Default)]
pub struct ClassLedger {
    classes: HashMap<ClassId, ClassAssignment>,
}

impl ClassLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_classes<I>(classes: I) -> Self
    where
        I: IntoIterator<Item = ClassAssignment>,
    {
        Self {
            classes: classes
                .into_iter()
                .map(|class| (class.class_id, class))
                .collect(),
        }
    }

    pub fn get(&self, class_id: ClassId) -> Option<&ClassAssignment> {
        self.classes.get(&class_id)
    }

    pub fn require(&self, class_id: ClassId) -> Result<&ClassAssignment, EngineError> {
        self.classes
            .get(&class_id)
            .ok_or(EngineError::UnknownClass(class_id))
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassAssignment> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Creates a class taught by `teacher_id`.
    ///
    /// The creator must be an ancestor of the teacher or an Admin of the
    /// teacher's organization. `supervisor_id` is the teacher's nearest
    /// Supervisor ancestor.
    pub fn create_class(
        &mut self,
        hierarchy: &HierarchyStore,
        creator: &Actor,
        teacher_id: UserId,
        class_name: &str,
    ) -> Result<ClassAssignment, EngineError> {
        let teacher = hierarchy.require(teacher_id)?;
        if teacher.role != Role::Teacher {
            return Err(EngineError::NotATeacher(teacher_id));
        }
        if !hierarchy.manages(creator, teacher_id) {
            return Err(EngineError::OutOfScope {
                actor: creator.user_id,
                target: teacher_id,
            });
        }

        let supervisor_id = hierarchy.nearest_with_role(teacher_id, Role::Supervisor);
        let class = ClassAssignment::new(
            class_name.trim(),
            teacher_id,
            supervisor_id,
            creator.user_id,
        );
        self.classes.insert(class.class_id, class.clone());
        Ok(class)
    }

    /// Hard-deletes a class. Student nodes are untouched.
    pub fn delete_class(
        &mut self,
        hierarchy: &HierarchyStore,
        actor: &Actor,
        class_id: ClassId,
    ) -> Result<ClassAssignment, EngineError> {
        self.check_manager(hierarchy, actor, class_id)?;
        self.classes
            .remove(&class_id)
            .ok_or(EngineError::UnknownClass(class_id))
    }

    /// Enrolls a student from the class's branch.
    ///
    /// Enrolling an existing member reports `AlreadyAssigned` and leaves the
    /// set unchanged.
    pub fn assign_student(
        &mut self,
        hierarchy: &HierarchyStore,
        actor: &Actor,
        class_id: ClassId,
        student_id: UserId,
    ) -> Result<ClassAssignment, EngineError> {
        self.check_manager(hierarchy, actor, class_id)?;

        let student = hierarchy.require(student_id)?;
        if student.role != Role::Student {
            return Err(EngineError::NotAStudent(student_id));
        }

        let class = self.require(class_id)?;
        let in_branch = branch_root(hierarchy, class.teacher_id)
            .is_some_and(|root| hierarchy.is_ancestor(root, student_id));
        if !in_branch {
            return Err(EngineError::OutOfScope {
                actor: actor.user_id,
                target: student_id,
            });
        }

        let class = self.require_mut(class_id)?;
        if !class.students.insert(student_id) {
            counter!("class_assignments_total", "outcome" => "already_assigned").increment(1);
            return Err(EngineError::AlreadyAssigned {
                class_id,
                student_id,
            });
        }
        counter!("class_assignments_total", "outcome" => "assigned").increment(1);
        Ok(class.clone())
    }

    pub fn unassign_student(
        &mut self,
        hierarchy: &HierarchyStore,
        actor: &Actor,
        class_id: ClassId,
        student_id: UserId,
    ) -> Result<ClassAssignment, EngineError> {
        self.check_manager(hierarchy, actor, class_id)?;

        let class = self.require_mut(class_id)?;
        if !class.students.remove(&student_id) {
            counter!("class_assignments_total", "outcome" => "not_assigned").increment(1);
            return Err(EngineError::NotAssigned {
                class_id,
                student_id,
            });
        }
        counter!("class_assignments_total", "outcome" => "unassigned").increment(1);
        Ok(class.clone())
    }

    /// Hands the class to another teacher under the same branch root.
    pub fn reassign_teacher(
        &mut self,
        hierarchy: &HierarchyStore,
        actor: &Actor,
        class_id: ClassId,
        teacher_id: UserId,
    ) -> Result<ClassAssignment, EngineError> {
        self.check_manager(hierarchy, actor, class_id)?;

        let teacher = hierarchy.require(teacher_id)?;
        if teacher.role != Role::Teacher {
            return Err(EngineError::NotATeacher(teacher_id));
        }
        let class = self.require(class_id)?;
        let in_branch = branch_root(hierarchy, class.teacher_id)
            .is_some_and(|root| hierarchy.is_ancestor(root, teacher_id));
        if !hierarchy.manages(actor, teacher_id) || !in_branch {
            return Err(EngineError::OutOfScope {
                actor: actor.user_id,
                target: teacher_id,
            });
        }

        let supervisor_id = hierarchy.nearest_with_role(teacher_id, Role::Supervisor);
        let class = self.require_mut(class_id)?;
        class.teacher_id = teacher_id;
        class.supervisor_id = supervisor_id;
        Ok(class.clone())
    }

    /// Binds a prompt. The class's own teacher may do this too.
    pub fn assign_prompt(
        &mut self,
        hierarchy: &HierarchyStore,
        actor: &Actor,
        class_id: ClassId,
        prompt_id: PromptId,
    ) -> Result<ClassAssignment, EngineError> {
        self.check_teacher_or_manager(hierarchy, actor, class_id)?;
        let class = self.require_mut(class_id)?;
        class.prompt_ref = Some(prompt_id);
        Ok(class.clone())
    }

    pub fn clear_prompt(
        &mut self,
        hierarchy: &HierarchyStore,
        actor: &Actor,
        class_id: ClassId,
    ) -> Result<ClassAssignment, EngineError> {
        self.check_teacher_or_manager(hierarchy, actor, class_id)?;
        let class = self.require_mut(class_id)?;
        class.prompt_ref = None;
        Ok(class.clone())
    }

    /// Classes where the actor is the teacher or one of the teacher's current
    /// ancestors. Admins see every class of their organization.
    pub fn visible_to(&self, hierarchy: &HierarchyStore, actor: &Actor) -> Vec<&ClassAssignment> {
        let mut visible: Vec<&ClassAssignment> = self
            .classes
            .values()
            .filter(|class| {
                class.teacher_id == actor.user_id || hierarchy.manages(actor, class.teacher_id)
            })
            .collect();
        sort_classes(&mut visible);
        visible
    }

    pub fn taught_by(&self, teacher_id: UserId) -> Vec<&ClassAssignment> {
        let mut classes: Vec<&ClassAssignment> = self
            .classes
            .values()
            .filter(|class| class.teacher_id == teacher_id)
            .collect();
        sort_classes(&mut classes);
        classes
    }

    pub fn attended_by(&self, student_id: UserId) -> Vec<&ClassAssignment> {
        let mut classes: Vec<&ClassAssignment> = self
            .classes
            .values()
            .filter(|class| class.has_student(student_id))
            .collect();
        sort_classes(&mut classes);
        classes
    }

    /// Union of students across every class the teacher teaches.
    pub fn students_of(&self, teacher_id: UserId) -> BTreeSet<UserId> {
        self.classes
            .values()
            .filter(|class| class.teacher_id == teacher_id)
            .flat_map(|class| class.students.iter().copied())
            .collect()
    }

    /// Re-derives every class's `supervisor_id` after the tree has moved.
    /// Returns how many classes changed.
    pub fn refresh_supervisors(&mut self, hierarchy: &HierarchyStore) -> usize {
        let mut changed = 0;
        for class in self.classes.values_mut() {
            let supervisor_id = hierarchy.nearest_with_role(class.teacher_id, Role::Supervisor);
            if class.supervisor_id != supervisor_id {
                class.supervisor_id = supervisor_id;
                changed += 1;
            }
        }
        changed
    }

    fn require_mut(&mut self, class_id: ClassId) -> Result<&mut ClassAssignment, EngineError> {
        self.classes
            .get_mut(&class_id)
            .ok_or(EngineError::UnknownClass(class_id))
    }

    fn check_manager(
        &self,
        hierarchy: &HierarchyStore,
        actor: &Actor,
        class_id: ClassId,
    ) -> Result<(), EngineError> {
        let class = self.require(class_id)?;
        if hierarchy.manages(actor, class.teacher_id) {
            Ok(())
        } else {
            Err(EngineError::OutOfScope {
                actor: actor.user_id,
                target: class.teacher_id,
            })
        }
    }

    fn check_teacher_or_manager(
        &self,
        hierarchy: &HierarchyStore,
        actor: &Actor,
        class_id: ClassId,
    ) -> Result<(), EngineError> {
        let class = self.require(class_id)?;
        if class.teacher_id == actor.user_id {
            return Ok(());
        }
        self.check_manager(hierarchy, actor, class_id)
    }
}

/// Subtree a class's students must come from, read from the current tree:
/// the teacher's nearest Supervisor, or the teacher's parent when the branch
/// has no supervisor.
fn branch_root(hierarchy: &HierarchyStore, teacher_id: UserId) -> Option<UserId> {
    hierarchy
        .nearest_with_role(teacher_id, Role::Supervisor)
        .or_else(|| hierarchy.get(teacher_id).and_then(|teacher| teacher.parent_id))
}

fn sort_classes(classes: &mut [&ClassAssignment]) {
    classes.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.class_id.cmp(&b.class_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranklane_models::{OrganizationId, UserNode};

    fn org() -> OrganizationId {
        OrganizationId::from_u128(100)
    }

    fn id(n: u128) -> UserId {
        UserId::from_u128(n)
    }

    fn actor(n: u128, role: Role) -> Actor {
        Actor::new(id(n), role, org())
    }

    /// Admin 1
    /// ├── Supervisor 2
    /// │   ├── Teacher 3
    /// │   ├── Teacher 6
    /// │   └── Student 4
    /// └── Supervisor 5
    ///     ├── Teacher 7
    ///     └── Student 8
    fn sample() -> HierarchyStore {
        let mut store = HierarchyStore::new();
        let add = |store: &mut HierarchyStore, n: u128, role: Role, parent: Option<u128>| {
            let node = UserNode::new(id(n), role, org());
            let node = match parent {
                Some(p) => node.with_parent(id(p)),
                None => node,
            };
            store.insert(node).unwrap();
        };
        add(&mut store, 1, Role::Admin, None);
        add(&mut store, 2, Role::Supervisor, Some(1));
        add(&mut store, 3, Role::Teacher, Some(2));
        add(&mut store, 4, Role::Student, Some(2));
        add(&mut store, 5, Role::Supervisor, Some(1));
        add(&mut store, 6, Role::Teacher, Some(2));
        add(&mut store, 7, Role::Teacher, Some(5));
        add(&mut store, 8, Role::Student, Some(5));
        store
    }

    #[test]
    fn test_create_class_records_supervisor() {
        let hierarchy = sample();
        let mut ledger = ClassLedger::new();

        let class = ledger
            .create_class(&hierarchy, &actor(1, Role::Admin), id(3), "Algebra")
            .unwrap();
        assert_eq!(class.supervisor_id, Some(id(2)));
        assert_eq!(class.created_by, id(1));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_create_class_requires_teacher_in_scope() {
        let hierarchy = sample();
        let mut ledger = ClassLedger::new();

        let err = ledger
            .create_class(&hierarchy, &actor(2, Role::Supervisor), id(4), "Art")
            .unwrap_err();
        assert_eq!(err, EngineError::NotATeacher(id(4)));

        let err = ledger
            .create_class(&hierarchy, &actor(2, Role::Supervisor), id(7), "Art")
            .unwrap_err();
        assert!(matches!(err, EngineError::OutOfScope { .. }));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_assign_student_twice_reports_already_assigned() {
        let hierarchy = sample();
        let mut ledger = ClassLedger::new();
        let supervisor = actor(2, Role::Supervisor);
        let class = ledger
            .create_class(&hierarchy, &supervisor, id(3), "Chemistry")
            .unwrap();

        let updated = ledger
            .assign_student(&hierarchy, &supervisor, class.class_id, id(4))
            .unwrap();
        assert_eq!(updated.students.len(), 1);

        let err = ledger
            .assign_student(&hierarchy, &supervisor, class.class_id, id(4))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::AlreadyAssigned {
                class_id: class.class_id,
                student_id: id(4),
            }
        );
        assert_eq!(ledger.get(class.class_id).unwrap().students.len(), 1);
    }

    #[test]
    fn test_assign_student_across_branches_is_rejected() {
        let hierarchy = sample();
        let mut ledger = ClassLedger::new();
        let admin = actor(1, Role::Admin);
        let class = ledger
            .create_class(&hierarchy, &admin, id(3), "History")
            .unwrap();

        let err = ledger
            .assign_student(&hierarchy, &admin, class.class_id, id(8))
            .unwrap_err();
        assert!(matches!(err, EngineError::OutOfScope { .. }));

        let err = ledger
            .assign_student(&hierarchy, &admin, class.class_id, id(6))
            .unwrap_err();
        assert_eq!(err, EngineError::NotAStudent(id(6)));
    }

    #[test]
    fn test_teacher_cannot_enroll_but_can_set_prompt() {
        let hierarchy = sample();
        let mut ledger = ClassLedger::new();
        let class = ledger
            .create_class(&hierarchy, &actor(2, Role::Supervisor), id(3), "Physics")
            .unwrap();
        let teacher = actor(3, Role::Teacher);

        let err = ledger
            .assign_student(&hierarchy, &teacher, class.class_id, id(4))
            .unwrap_err();
        assert!(matches!(err, EngineError::OutOfScope { .. }));

        let prompt = PromptId::from_u128(77);
        let updated = ledger
            .assign_prompt(&hierarchy, &teacher, class.class_id, prompt)
            .unwrap();
        assert_eq!(updated.prompt_ref, Some(prompt));

        let cleared = ledger
            .clear_prompt(&hierarchy, &teacher, class.class_id)
            .unwrap();
        assert!(cleared.prompt_ref.is_none());

        let err = ledger
            .clear_prompt(&hierarchy, &actor(6, Role::Teacher), class.class_id)
            .unwrap_err();
        assert!(matches!(err, EngineError::OutOfScope { .. }));
    }

    #[test]
    fn test_unassign_non_member_reports_not_assigned() {
        let hierarchy = sample();
        let mut ledger = ClassLedger::new();
        let supervisor = actor(2, Role::Supervisor);
        let class = ledger
            .create_class(&hierarchy, &supervisor, id(3), "Music")
            .unwrap();

        let err = ledger
            .unassign_student(&hierarchy, &supervisor, class.class_id, id(4))
            .unwrap_err();
        assert!(matches!(err, EngineError::NotAssigned { .. }));
    }

    #[test]
    fn test_reassign_teacher_stays_in_branch() {
        let hierarchy = sample();
        let mut ledger = ClassLedger::new();
        let admin = actor(1, Role::Admin);
        let class = ledger
            .create_class(&hierarchy, &admin, id(3), "Geography")
            .unwrap();

        let moved = ledger
            .reassign_teacher(&hierarchy, &admin, class.class_id, id(6))
            .unwrap();
        assert_eq!(moved.teacher_id, id(6));
        assert_eq!(moved.supervisor_id, Some(id(2)));

        let err = ledger
            .reassign_teacher(&hierarchy, &admin, class.class_id, id(7))
            .unwrap_err();
        assert!(matches!(err, EngineError::OutOfScope { .. }));
    }

    #[test]
    fn test_visible_to_and_delete() {
        let hierarchy = sample();
        let mut ledger = ClassLedger::new();
        let admin = actor(1, Role::Admin);
        let first = ledger.create_class(&hierarchy, &admin, id(3), "A").unwrap();
        ledger.create_class(&hierarchy, &admin, id(7), "B").unwrap();

        assert_eq!(ledger.visible_to(&hierarchy, &admin).len(), 2);
        assert_eq!(
            ledger
                .visible_to(&hierarchy, &actor(2, Role::Supervisor))
                .len(),
            1
        );
        assert_eq!(
            ledger.visible_to(&hierarchy, &actor(3, Role::Teacher))[0].class_id,
            first.class_id
        );
        assert!(ledger
            .visible_to(&hierarchy, &actor(4, Role::Student))
            .is_empty());

        let err = ledger
            .delete_class(&hierarchy, &actor(5, Role::Supervisor), first.class_id)
            .unwrap_err();
        assert!(matches!(err, EngineError::OutOfScope { .. }));

        ledger
            .delete_class(&hierarchy, &admin, first.class_id)
            .unwrap();
        assert!(ledger.get(first.class_id).is_none());
    }

    #[test]
    fn test_moved_teacher_takes_students_from_new_branch() {
        let mut hierarchy = sample();
        let mut ledger = ClassLedger::new();
        let admin = actor(1, Role::Admin);
        let class = ledger
            .create_class(&hierarchy, &actor(2, Role::Supervisor), id(3), "Latin")
            .unwrap();

        hierarchy.reparent(id(3), id(5)).unwrap();

        let err = ledger
            .assign_student(&hierarchy, &actor(5, Role::Supervisor), class.class_id, id(4))
            .unwrap_err();
        assert!(matches!(err, EngineError::OutOfScope { .. }));
        let err = ledger
            .assign_student(&hierarchy, &admin, class.class_id, id(4))
            .unwrap_err();
        assert!(matches!(err, EngineError::OutOfScope { .. }));

        ledger
            .assign_student(&hierarchy, &actor(5, Role::Supervisor), class.class_id, id(8))
            .unwrap();
        assert!(ledger
            .visible_to(&hierarchy, &actor(2, Role::Supervisor))
            .is_empty());
        assert_eq!(
            ledger.visible_to(&hierarchy, &actor(5, Role::Supervisor)).len(),
            1
        );

        assert_eq!(ledger.refresh_supervisors(&hierarchy), 1);
        assert_eq!(ledger.get(class.class_id).unwrap().supervisor_id, Some(id(5)));
        assert_eq!(ledger.refresh_supervisors(&hierarchy), 0);
    }
}
