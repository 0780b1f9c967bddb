//! Demo data generation.
//!
//! Every record goes through [`PermissionFacade`], so a seeded partition obeys
//! the same role-order and scope rules as one built through the API.

use std::time::Instant;

use anyhow::Result;
use fake::Fake;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::{FirstName, LastName};
use ranklane_engine::PermissionFacade;
use ranklane_models::{Actor, CreateClassDto, CreateUserDto, Role, UserId, UserNode};

/// How many users of each role to create below the organization root.
#[derive(Debug, Clone, Copy)]
pub struct SeedConfig {
    pub supervisors: usize,
    pub teachers_per_supervisor: usize,
    pub students_per_teacher: usize,
    /// One class per teacher, holding that teacher's students.
    pub with_classes: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            supervisors: 2,
            teachers_per_supervisor: 3,
            students_per_teacher: 10,
            with_classes: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub supervisors: usize,
    pub teachers: usize,
    pub students: usize,
    pub classes: usize,
    pub enrollments: usize,
}

/// Seeds one organization as `admin`, who becomes its root if unknown.
pub fn seed_organization(
    engine: &PermissionFacade,
    admin: Actor,
    config: SeedConfig,
) -> Result<SeedSummary> {
    anyhow::ensure!(admin.role == Role::Admin, "seeding requires an admin actor");

    let start = Instant::now();
    let mut summary = SeedSummary::default();

    for _ in 0..config.supervisors {
        let supervisor = create(engine, &admin, Role::Supervisor, admin.user_id)?;
        summary.supervisors += 1;

        for _ in 0..config.teachers_per_supervisor {
            let teacher = create(engine, &admin, Role::Teacher, supervisor.user_id)?;
            summary.teachers += 1;

            let mut students = Vec::with_capacity(config.students_per_teacher);
            for _ in 0..config.students_per_teacher {
                students.push(create(engine, &admin, Role::Student, teacher.user_id)?);
            }
            summary.students += students.len();

            if config.with_classes {
                let subject = capitalize(&Word().fake::<String>());
                let class_name = format!("{} {}", subject, teacher.name);
                let class = engine.create_class(
                    &admin,
                    CreateClassDto {
                        class_name,
                        teacher_id: teacher.user_id,
                    },
                )?;
                summary.classes += 1;

                for student in &students {
                    engine.assign_student(&admin, class.class_id, student.user_id)?;
                    summary.enrollments += 1;
                }
            }
        }
    }

    println!(
        "   Seeded {} supervisors, {} teachers, {} students in {:.2?}",
        summary.supervisors,
        summary.teachers,
        summary.students,
        start.elapsed()
    );

    Ok(summary)
}

fn create(
    engine: &PermissionFacade,
    admin: &Actor,
    role: Role,
    parent: UserId,
) -> Result<UserNode> {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();
    let user_id = UserId::new();

    let node = engine.create_user(
        admin,
        CreateUserDto {
            user_id: Some(user_id),
            role,
            name: format!("{} {}", first_name, last_name),
            email: email_for(&first_name, &last_name, user_id),
            parent_id: Some(parent),
        },
    )?;
    Ok(node)
}

/// Unique, address-safe email for a generated user.
fn email_for(first_name: &str, last_name: &str, user_id: UserId) -> String {
    let local: String = format!("{}.{}", first_name, last_name)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect::<String>()
        .to_lowercase();
    let suffix = user_id.to_string();
    format!("{}.{}@example.com", local, &suffix[..8])
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
