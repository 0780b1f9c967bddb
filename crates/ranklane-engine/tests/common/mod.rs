#![allow(dead_code)]

use ranklane_engine::PermissionFacade;
use ranklane_models::{Actor, CreateUserDto, OrganizationId, Role, UserId};

/// Admin A -> Supervisor S -> Teacher T, with Student U created by S.
pub struct School {
    pub org: OrganizationId,
    pub admin: Actor,
    pub supervisor: Actor,
    pub teacher: Actor,
    pub student: Actor,
}

pub fn create(engine: &PermissionFacade, by: &Actor, role: Role, name: &str) -> Actor {
    create_under(engine, by, role, name, None)
}

pub fn create_under(
    engine: &PermissionFacade,
    by: &Actor,
    role: Role,
    name: &str,
    parent: Option<UserId>,
) -> Actor {
    let node = engine
        .create_user(
            by,
            CreateUserDto {
                user_id: None,
                role,
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                parent_id: parent,
            },
        )
        .unwrap();
    Actor::new(node.user_id, node.role, node.organization_id)
}

pub fn school(engine: &PermissionFacade) -> School {
    let org = OrganizationId::new();
    let admin = Actor::new(UserId::new(), Role::Admin, org);
    let supervisor = create(engine, &admin, Role::Supervisor, "Sam");
    let teacher = create(engine, &supervisor, Role::Teacher, "Tia");
    let student = create(engine, &supervisor, Role::Student, "Uma");
    School {
        org,
        admin,
        supervisor,
        teacher,
        student,
    }
}
