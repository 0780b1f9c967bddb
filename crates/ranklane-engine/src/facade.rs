//! The permission façade.
//!
//! Every caller goes through [`PermissionFacade`]. Each operation receives
//! the verified [`Actor`] explicitly, authenticates it against its
//! organization's partition, then reads a snapshot or runs a serialized
//! mutation. Authorization failures of any kind are logged with their
//! internal rule and returned as [`EngineError::PermissionDenied`].

use std::collections::HashSet;
use std::sync::Arc;

use metrics::counter;
use ranklane_config::StoreConfig;
use ranklane_models::{
    AccessLevel, Actor, ClassAssignment, ClassId, ClassSummary, CreateClassDto, CreateUserDto,
    DocumentAccessRecord, DocumentCheckDto, DocumentId, ManagedUser, OrganizationId,
    PermissionSet, PromptId, RebuildReport, RegisterDocumentDto, Role, StatusChange,
    StudentAssignments, TeacherSummary, UserId, UserNode, UserRelation, UserStatus,
};
use tracing::{debug, info, instrument, warn};

use crate::error::EngineError;
use crate::partition::{Partition, Partitions, TenantState};
use crate::resolver::{self, DocumentRef, VisibilityFilter};
use crate::store::{MemoryStore, PartitionStore, open_store};

#[derive(Debug)]
pub struct PermissionFacade {
    partitions: Partitions,
}

impl PermissionFacade {
    pub fn new(store: Arc<dyn PartitionStore>) -> Self {
        Self {
            partitions: Partitions::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(open_store(config))
    }

    /// Latest committed state of an organization, for inspection tooling.
    pub fn snapshot(&self, org: OrganizationId) -> Result<Arc<TenantState>, EngineError> {
        Ok(self.partitions.get(org)?.snapshot())
    }

    // Capabilities

    /// Static capabilities of the actor's role.
    pub fn resolve(actor: &Actor) -> PermissionSet {
        PermissionSet::for_role(actor.role)
    }

    /// Capabilities of an authenticated actor.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn permissions(&self, actor: &Actor) -> Result<PermissionSet, EngineError> {
        self.authenticate(actor)?;
        Ok(Self::resolve(actor))
    }

    pub fn can_manage(&self, actor: &Actor, target: UserId) -> Result<bool, EngineError> {
        let partition = self.authenticate(actor)?;
        Ok(partition.snapshot().hierarchy.manages(actor, target))
    }

    // Users

    #[instrument(skip(self, actor, dto), fields(actor = %actor.user_id, role = %dto.role))]
    pub fn create_user(&self, actor: &Actor, dto: CreateUserDto) -> Result<UserNode, EngineError> {
        let partition = self.authenticate(actor)?;

        if !actor.role.can_create(dto.role) {
            return Err(deny(actor, "role_not_creatable"));
        }

        let org = actor.organization_id;
        let node = partition
            .mutate(org, self.partitions.store(), |state| {
                let parent_id = dto.parent_id.unwrap_or(actor.user_id);
                if parent_id != actor.user_id && !state.hierarchy.manages(actor, parent_id) {
                    return Err(deny(actor, "parent_out_of_scope"));
                }

                let node = UserNode::new(dto.user_id.unwrap_or_default(), dto.role, org)
                    .with_parent(parent_id)
                    .with_creator(actor.user_id)
                    .with_profile(dto.name.trim(), dto.email.trim());
                state.hierarchy.insert(node.clone())?;
                Ok(node)
            })
            .map_err(|err| conceal(actor, err))?;

        counter!("users_created_total", "role" => node.role.as_str()).increment(1);
        info!(user_id = %node.user_id, parent_id = ?node.parent_id, "user created");
        Ok(node)
    }

    /// Users the actor manages, tagged with how they relate to the actor.
    ///
    /// Teachers also get the students enrolled in their classes.
    pub fn list_managed_users(
        &self,
        actor: &Actor,
        include_indirect: bool,
    ) -> Result<Vec<ManagedUser>, EngineError> {
        let state = self.authenticate(actor)?.snapshot();
        let hierarchy = &state.hierarchy;

        let mut seen = HashSet::new();
        let mut users: Vec<ManagedUser> = hierarchy
            .nodes()
            .filter(|node| hierarchy.manages(actor, node.user_id))
            .filter_map(|node| {
                let relation = if node.parent_id == Some(actor.user_id) {
                    UserRelation::Direct
                } else if include_indirect {
                    UserRelation::Indirect
                } else {
                    return None;
                };
                seen.insert(node.user_id);
                Some(ManagedUser {
                    user: node.clone(),
                    relation,
                })
            })
            .collect();

        if actor.role == Role::Teacher {
            for student_id in state.classes.students_of(actor.user_id) {
                if seen.contains(&student_id) {
                    continue;
                }
                if let Some(node) = hierarchy.get(student_id) {
                    users.push(ManagedUser {
                        user: node.clone(),
                        relation: UserRelation::ClassMember,
                    });
                }
            }
        }

        users.sort_by(|a, b| {
            a.user
                .role
                .cmp(&b.user.role)
                .reverse()
                .then_with(|| a.user.created_at.cmp(&b.user.created_at))
                .then_with(|| a.user.user_id.cmp(&b.user.user_id))
        });
        Ok(users)
    }

    /// The actor's own node, or a managed user's node.
    pub fn get_user(&self, actor: &Actor, target: Option<UserId>) -> Result<UserNode, EngineError> {
        let state = self.authenticate(actor)?.snapshot();
        let target = target.unwrap_or(actor.user_id);

        if target != actor.user_id && !state.hierarchy.manages(actor, target) {
            return Err(deny(actor, "not_manager"));
        }
        state
            .hierarchy
            .require(target)
            .cloned()
            .map_err(|err| conceal(actor, err))
    }

    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn update_status(
        &self,
        actor: &Actor,
        target: UserId,
        status: UserStatus,
    ) -> Result<StatusChange, EngineError> {
        let partition = self.authenticate(actor)?;

        let current = partition.snapshot();
        if !current.hierarchy.manages(actor, target) {
            return Err(deny(actor, "not_manager"));
        }
        if let Some(node) = current
            .hierarchy
            .get(target)
            .filter(|node| node.status == status)
        {
            return Ok(StatusChange {
                user: node.clone(),
                changed: false,
            });
        }

        partition
            .mutate(actor.organization_id, self.partitions.store(), |state| {
                if !state.hierarchy.manages(actor, target) {
                    return Err(deny(actor, "not_manager"));
                }
                let changed = state.hierarchy.set_status(target, status)?;
                let user = state.hierarchy.require(target)?.clone();
                Ok(StatusChange { user, changed })
            })
            .map_err(|err| conceal(actor, err))
    }

    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn reparent_user(
        &self,
        actor: &Actor,
        target: UserId,
        new_parent: UserId,
    ) -> Result<UserNode, EngineError> {
        let partition = self.authenticate(actor)?;

        partition
            .mutate(actor.organization_id, self.partitions.store(), |state| {
                if !state.hierarchy.manages(actor, target) {
                    return Err(deny(actor, "not_manager"));
                }
                if new_parent != actor.user_id && !state.hierarchy.manages(actor, new_parent) {
                    return Err(deny(actor, "parent_out_of_scope"));
                }
                state.hierarchy.reparent(target, new_parent)?;
                let refreshed = state.classes.refresh_supervisors(&state.hierarchy);
                if refreshed > 0 {
                    debug!(classes = refreshed, "class supervisors re-derived after reparent");
                }
                Ok(state.hierarchy.require(target)?.clone())
            })
            .map_err(|err| conceal(actor, err))
    }

    /// Admin-only drift recovery over the actor's organization.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn rebuild_hierarchy(&self, actor: &Actor) -> Result<RebuildReport, EngineError> {
        let partition = self.authenticate(actor)?;
        if !actor.is_admin() {
            return Err(deny(actor, "admin_only"));
        }

        partition.mutate(actor.organization_id, self.partitions.store(), |state| {
            let nodes: Vec<UserNode> = state.hierarchy.nodes().cloned().collect();
            let report = state.hierarchy.rebuild(nodes)?;
            state.classes.refresh_supervisors(&state.hierarchy);
            Ok(report)
        })
    }

    // Classes

    #[instrument(skip(self, actor, dto), fields(actor = %actor.user_id, teacher = %dto.teacher_id))]
    pub fn create_class(
        &self,
        actor: &Actor,
        dto: CreateClassDto,
    ) -> Result<ClassAssignment, EngineError> {
        let partition = self.authenticate(actor)?;
        if actor.role < Role::Supervisor {
            return Err(deny(actor, "class_creator_role"));
        }

        partition
            .mutate(actor.organization_id, self.partitions.store(), |state| {
                state
                    .classes
                    .create_class(&state.hierarchy, actor, dto.teacher_id, &dto.class_name)
            })
            .map_err(|err| conceal(actor, err))
    }

    pub fn delete_class(&self, actor: &Actor, class_id: ClassId) -> Result<(), EngineError> {
        self.mutate_class(actor, |state| {
            state.classes.delete_class(&state.hierarchy, actor, class_id)
        })
        .map(|_| ())
    }

    pub fn assign_student(
        &self,
        actor: &Actor,
        class_id: ClassId,
        student_id: UserId,
    ) -> Result<ClassAssignment, EngineError> {
        self.mutate_class(actor, |state| {
            state
                .classes
                .assign_student(&state.hierarchy, actor, class_id, student_id)
        })
    }

    pub fn unassign_student(
        &self,
        actor: &Actor,
        class_id: ClassId,
        student_id: UserId,
    ) -> Result<ClassAssignment, EngineError> {
        self.mutate_class(actor, |state| {
            state
                .classes
                .unassign_student(&state.hierarchy, actor, class_id, student_id)
        })
    }

    pub fn reassign_teacher(
        &self,
        actor: &Actor,
        class_id: ClassId,
        teacher_id: UserId,
    ) -> Result<ClassAssignment, EngineError> {
        self.mutate_class(actor, |state| {
            state
                .classes
                .reassign_teacher(&state.hierarchy, actor, class_id, teacher_id)
        })
    }

    pub fn assign_prompt(
        &self,
        actor: &Actor,
        class_id: ClassId,
        prompt_id: PromptId,
    ) -> Result<ClassAssignment, EngineError> {
        self.mutate_class(actor, |state| {
            state
                .classes
                .assign_prompt(&state.hierarchy, actor, class_id, prompt_id)
        })
    }

    pub fn clear_prompt(
        &self,
        actor: &Actor,
        class_id: ClassId,
    ) -> Result<ClassAssignment, EngineError> {
        self.mutate_class(actor, |state| {
            state.classes.clear_prompt(&state.hierarchy, actor, class_id)
        })
    }

    pub fn classes_visible_to(&self, actor: &Actor) -> Result<Vec<ClassSummary>, EngineError> {
        let state = self.authenticate(actor)?.snapshot();
        Ok(state
            .classes
            .visible_to(&state.hierarchy, actor)
            .into_iter()
            .map(|class| summarize(&state, class))
            .collect())
    }

    pub fn teacher_classes(
        &self,
        actor: &Actor,
        teacher_id: UserId,
    ) -> Result<Vec<ClassAssignment>, EngineError> {
        let state = self.authenticate(actor)?.snapshot();
        check_self_or_manager(&state, actor, teacher_id)?;
        Ok(state
            .classes
            .taught_by(teacher_id)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn teacher_students(
        &self,
        actor: &Actor,
        teacher_id: UserId,
    ) -> Result<Vec<UserNode>, EngineError> {
        let state = self.authenticate(actor)?.snapshot();
        check_self_or_manager(&state, actor, teacher_id)?;
        Ok(state
            .classes
            .students_of(teacher_id)
            .into_iter()
            .filter_map(|id| state.hierarchy.get(id).cloned())
            .collect())
    }

    pub fn student_teachers(
        &self,
        actor: &Actor,
        student_id: UserId,
    ) -> Result<Vec<TeacherSummary>, EngineError> {
        Ok(self.student_assignments(actor, student_id)?.teachers)
    }

    pub fn student_assignments(
        &self,
        actor: &Actor,
        student_id: UserId,
    ) -> Result<StudentAssignments, EngineError> {
        let state = self.authenticate(actor)?.snapshot();
        check_self_or_manager(&state, actor, student_id)?;

        let classes: Vec<ClassAssignment> = state
            .classes
            .attended_by(student_id)
            .into_iter()
            .cloned()
            .collect();
        let teachers = classes
            .iter()
            .map(|class| TeacherSummary {
                teacher_id: class.teacher_id,
                teacher_name: state
                    .hierarchy
                    .get(class.teacher_id)
                    .map(|node| node.name.clone())
                    .unwrap_or_default(),
                class_id: class.class_id,
                class_name: class.class_name.clone(),
            })
            .collect();
        Ok(StudentAssignments { classes, teachers })
    }

    // Documents

    #[instrument(skip(self, actor, dto), fields(actor = %actor.user_id))]
    pub fn register_document(
        &self,
        actor: &Actor,
        dto: RegisterDocumentDto,
    ) -> Result<DocumentAccessRecord, EngineError> {
        let partition = self.authenticate(actor)?;
        if !resolver::can_set_access_level(actor.role, dto.access_level) {
            return Err(deny(actor, "access_level_not_allowed"));
        }

        let record = DocumentAccessRecord::new(
            dto.document_id.unwrap_or_default(),
            actor.user_id,
            dto.access_level,
            actor.organization_id,
        );
        partition.mutate(actor.organization_id, self.partitions.store(), |state| {
            state.documents.register(record.clone())?;
            Ok(record)
        })
    }

    /// Changes a document's level. The actor must own the document or be an
    /// ancestor of its owner, and `public` needs an owner of at least Teacher.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn set_access_level(
        &self,
        actor: &Actor,
        document_id: DocumentId,
        access_level: AccessLevel,
    ) -> Result<DocumentAccessRecord, EngineError> {
        let partition = self.authenticate(actor)?;
        if !resolver::can_set_access_level(actor.role, access_level) {
            return Err(deny(actor, "access_level_not_allowed"));
        }

        partition
            .mutate(actor.organization_id, self.partitions.store(), |state| {
                let record = state.documents.require(document_id)?;
                check_owner_or_ancestor(state, actor, record.owner_id)?;
                if access_level == AccessLevel::Public {
                    let owner = state.hierarchy.require(record.owner_id)?;
                    if !resolver::owner_may_publish(owner.role) {
                        return Err(deny(actor, "owner_cannot_publish"));
                    }
                }
                state.documents.set_access_level(document_id, access_level)
            })
            .map_err(|err| conceal(actor, err))
    }

    pub fn remove_document(&self, actor: &Actor, document_id: DocumentId) -> Result<(), EngineError> {
        let partition = self.authenticate(actor)?;
        partition
            .mutate(actor.organization_id, self.partitions.store(), |state| {
                let record = state.documents.require(document_id)?;
                check_owner_or_ancestor(state, actor, record.owner_id)?;
                state.documents.remove(document_id).map(|_| ())
            })
            .map_err(|err| conceal(actor, err))
    }

    /// A registered document the actor may view.
    pub fn authorize_document_view(
        &self,
        actor: &Actor,
        document_id: DocumentId,
    ) -> Result<DocumentAccessRecord, EngineError> {
        let state = self.authenticate(actor)?.snapshot();
        let record = state
            .documents
            .require(document_id)
            .map_err(|err| conceal(actor, err))?;
        if !resolver::can_view(&state.hierarchy, actor, record.into()) {
            return Err(deny(actor, "document_not_visible"));
        }
        Ok(record.clone())
    }

    /// Allow/deny for a document tracked outside the engine.
    pub fn check_document(&self, actor: &Actor, dto: &DocumentCheckDto) -> Result<bool, EngineError> {
        let state = self.authenticate(actor)?.snapshot();
        let doc = DocumentRef {
            owner_id: dto.owner_id,
            access_level: dto.access_level,
            organization_id: dto.organization_id.unwrap_or(actor.organization_id),
        };
        let allowed = resolver::can_view(&state.hierarchy, actor, doc);
        if !allowed {
            debug!(actor = %actor.user_id, owner = %doc.owner_id, "document check denied");
            counter!("authz_denied_total", "rule" => "document_not_visible").increment(1);
        }
        Ok(allowed)
    }

    /// Listing predicate for the actor, from the latest snapshot.
    pub fn authorize_document_list(&self, actor: &Actor) -> Result<VisibilityFilter, EngineError> {
        let state = self.authenticate(actor)?.snapshot();
        Ok(VisibilityFilter::new(&state.hierarchy, actor))
    }

    /// Registered documents the actor may view, with the filter that selected them.
    pub fn list_visible_documents(
        &self,
        actor: &Actor,
    ) -> Result<(Vec<DocumentAccessRecord>, VisibilityFilter), EngineError> {
        let state = self.authenticate(actor)?.snapshot();
        let filter = VisibilityFilter::new(&state.hierarchy, actor);

        let mut documents: Vec<DocumentAccessRecord> = state
            .documents
            .records()
            .filter(|record| filter.matches(DocumentRef::from(*record)))
            .cloned()
            .collect();
        documents.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        Ok((documents, filter))
    }

    // Internals

    /// Resolves the actor's partition and checks the actor against it.
    ///
    /// An Admin unknown to the store becomes a root of its organization.
    fn authenticate(&self, actor: &Actor) -> Result<Arc<Partition>, EngineError> {
        let partition = self.partitions.get(actor.organization_id)?;
        let state = partition.snapshot();

        match state.hierarchy.get(actor.user_id) {
            Some(node) if node.role != actor.role => Err(deny(actor, "role_claim_mismatch")),
            Some(node) if !node.is_active() => {
                Err(conceal(actor, EngineError::InactiveActor(actor.user_id)))
            }
            Some(_) => Ok(partition),
            None if actor.is_admin() => {
                self.register_root(&partition, actor)?;
                Ok(partition)
            }
            None => Err(deny(actor, "unknown_actor")),
        }
    }

    fn register_root(&self, partition: &Partition, actor: &Actor) -> Result<(), EngineError> {
        let created = partition.mutate(actor.organization_id, self.partitions.store(), |state| {
            if state.hierarchy.get(actor.user_id).is_some() {
                return Ok(false);
            }
            let root = UserNode::new(actor.user_id, Role::Admin, actor.organization_id)
                .with_creator(actor.user_id);
            state.hierarchy.insert(root)?;
            Ok(true)
        })?;

        if created {
            counter!("users_created_total", "role" => Role::Admin.as_str()).increment(1);
            info!(
                user_id = %actor.user_id,
                organization_id = %actor.organization_id,
                "organization root registered"
            );
        }
        Ok(())
    }

    fn mutate_class<F>(&self, actor: &Actor, change: F) -> Result<ClassAssignment, EngineError>
    where
        F: FnOnce(&mut TenantState) -> Result<ClassAssignment, EngineError>,
    {
        let partition = self.authenticate(actor)?;
        partition
            .mutate(actor.organization_id, self.partitions.store(), change)
            .map_err(|err| conceal(actor, err))
    }
}

/// Logs the internal rule and returns the opaque denial.
fn deny(actor: &Actor, rule: &'static str) -> EngineError {
    warn!(
        actor = %actor.user_id,
        role = %actor.role,
        organization_id = %actor.organization_id,
        rule,
        "authorization denied"
    );
    counter!("authz_denied_total", "rule" => rule).increment(1);
    EngineError::PermissionDenied
}

fn conceal(actor: &Actor, err: EngineError) -> EngineError {
    match err.denial_rule() {
        Some(rule) => deny(actor, rule),
        None => err,
    }
}

fn check_self_or_manager(
    state: &TenantState,
    actor: &Actor,
    target: UserId,
) -> Result<(), EngineError> {
    if target == actor.user_id || state.hierarchy.manages(actor, target) {
        Ok(())
    } else {
        Err(deny(actor, "not_manager"))
    }
}

fn check_owner_or_ancestor(
    state: &TenantState,
    actor: &Actor,
    owner_id: UserId,
) -> Result<(), EngineError> {
    if owner_id == actor.user_id || state.hierarchy.is_ancestor(actor.user_id, owner_id) {
        Ok(())
    } else {
        Err(deny(actor, "not_owner_or_ancestor"))
    }
}

fn summarize(state: &TenantState, class: &ClassAssignment) -> ClassSummary {
    let teacher = state.hierarchy.get(class.teacher_id);
    ClassSummary {
        class: class.clone(),
        teacher_name: teacher.map(|node| node.name.clone()).unwrap_or_default(),
        teacher_email: teacher.map(|node| node.email.clone()).unwrap_or_default(),
    }
}
