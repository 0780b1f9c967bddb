use std::sync::Arc;

use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input};
use dotenvy::dotenv;
use ranklane_auth::create_access_token;
use ranklane_cli::rebuild::plan_rebuild;
use ranklane_cli::seeder::{self, SeedConfig};
use ranklane_cli::tree::render_tree;
use ranklane_config::{JwtConfig, StoreBackend, StoreConfig};
use ranklane_engine::{JsonFileStore, PartitionStore, PermissionFacade, TenantState};
use ranklane_models::{Actor, OrganizationId, Role, UserId};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "ranklane-cli")]
#[command(about = "Ranklane CLI - Administrative tools for Ranklane partitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint a development bearer token signed with JWT_SECRET
    IssueToken {
        /// User id placed in the `sub` claim
        #[arg(long)]
        sub: Option<Uuid>,

        /// Role claim: admin, supervisor, teacher or student
        #[arg(short = 'r', long)]
        role: Option<Role>,

        /// Organization id placed in the `org_id` claim
        #[arg(short = 'o', long)]
        org: Option<Uuid>,

        /// Email claim
        #[arg(short = 'e', long, default_value = "dev@example.com")]
        email: String,
    },
    /// Write a demo organization to the file store
    Seed {
        /// Organization to seed (random when omitted)
        #[arg(short = 'o', long)]
        org: Option<Uuid>,

        /// Admin that roots the organization (random when omitted)
        #[arg(long)]
        admin: Option<Uuid>,

        /// Number of supervisors under the admin
        #[arg(long, default_value = "2")]
        supervisors: usize,

        /// Number of teachers per supervisor
        #[arg(long, default_value = "3")]
        teachers: usize,

        /// Number of students per teacher
        #[arg(long, default_value = "10")]
        students: usize,

        /// Skip creating one class per teacher
        #[arg(long)]
        no_classes: bool,
    },
    /// Recompute an organization's ancestor index and reattach orphans
    Rebuild {
        #[arg(short = 'o', long)]
        org: Uuid,

        /// Write the result without asking
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Print an organization's delegation tree
    Tree {
        #[arg(short = 'o', long)]
        org: Uuid,
    },
}

fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::IssueToken {
            sub,
            role,
            org,
            email,
        } => handle_issue_token(sub, role, org, email),
        Commands::Seed {
            org,
            admin,
            supervisors,
            teachers,
            students,
            no_classes,
        } => handle_seed(
            org,
            admin,
            SeedConfig {
                supervisors,
                teachers_per_supervisor: teachers,
                students_per_teacher: students,
                with_classes: !no_classes,
            },
        ),
        Commands::Rebuild { org, yes } => handle_rebuild(org, yes),
        Commands::Tree { org } => handle_tree(org),
    };

    if let Err(e) = result {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
}

/// The file store from `STORE_DIR`; the CLI always works on files.
fn file_store() -> JsonFileStore {
    match StoreConfig::from_env().backend {
        StoreBackend::File { dir } => JsonFileStore::new(dir),
        StoreBackend::Memory => JsonFileStore::new(
            std::env::var("STORE_DIR").unwrap_or_else(|_| "storage/partitions".to_string()),
        ),
    }
}

fn handle_issue_token(
    sub: Option<Uuid>,
    role: Option<Role>,
    org: Option<Uuid>,
    email: String,
) -> anyhow::Result<()> {
    let role = match role {
        Some(role) => role,
        None => Input::<String>::new()
            .with_prompt("Role (admin, supervisor, teacher, student)")
            .interact_text()?
            .parse()?,
    };
    let actor = Actor::new(
        sub.map(UserId::from_uuid).unwrap_or_default(),
        role,
        org.map(OrganizationId::from_uuid).unwrap_or_default(),
    );

    let token = create_access_token(&actor, &email, &JwtConfig::from_env())
        .map_err(|e| e.error)?;

    println!("✅ Token issued");
    println!("   sub:    {}", actor.user_id);
    println!("   role:   {}", actor.role);
    println!("   org_id: {}", actor.organization_id);
    println!("\n{}", token);
    Ok(())
}

fn handle_seed(org: Option<Uuid>, admin: Option<Uuid>, config: SeedConfig) -> anyhow::Result<()> {
    let store = file_store();
    let admin = Actor::new(
        admin.map(UserId::from_uuid).unwrap_or_default(),
        Role::Admin,
        org.map(OrganizationId::from_uuid).unwrap_or_default(),
    );

    println!(
        "🌱 Seeding organization {} into {}",
        admin.organization_id,
        store.dir().display()
    );
    let engine = PermissionFacade::new(Arc::new(store));
    let summary = seeder::seed_organization(&engine, admin, config)?;

    println!("\n✅ Seed complete");
    println!("   Admin:       {}", admin.user_id);
    println!("   Classes:     {}", summary.classes);
    println!("   Enrollments: {}", summary.enrollments);
    Ok(())
}

fn handle_rebuild(org: Uuid, yes: bool) -> anyhow::Result<()> {
    let org = OrganizationId::from_uuid(org);
    let store = file_store();
    let records = store
        .load(org)?
        .ok_or_else(|| anyhow::anyhow!("No partition stored for organization {}", org))?;

    let plan = plan_rebuild(records)?;
    let report = &plan.report;

    println!("🔧 Rebuilt organization {}", org);
    println!("   Nodes: {}", report.nodes);
    println!("   Edges: {} (stored {})", report.edges, plan.stored_edges);
    for reattachment in &report.reattached {
        println!(
            "   ⚠️  {} reattached: {} -> {}",
            reattachment.user_id,
            reattachment
                .previous_parent
                .map_or_else(|| "none".to_string(), |id| id.to_string()),
            reattachment
                .new_parent
                .map_or_else(|| "root".to_string(), |id| id.to_string()),
        );
    }

    let Some(rebuilt) = plan.records else {
        println!("\n✅ Partition is consistent, nothing to write");
        return Ok(());
    };

    let confirmed = yes
        || Confirm::new()
            .with_prompt("Write the rebuilt partition back?")
            .default(false)
            .interact()?;
    if !confirmed {
        println!("Aborted, nothing written");
        return Ok(());
    }

    store.save(org, &rebuilt)?;
    println!("\n✅ Partition written to {}", store.path_for(org).display());
    Ok(())
}

fn handle_tree(org: Uuid) -> anyhow::Result<()> {
    let org = OrganizationId::from_uuid(org);
    let records = file_store()
        .load(org)?
        .ok_or_else(|| anyhow::anyhow!("No partition stored for organization {}", org))?;
    let (state, _) = TenantState::from_records(records)?;

    print!("{}", render_tree(&state.hierarchy));
    Ok(())
}
