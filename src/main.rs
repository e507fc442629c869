use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use docflow::policy;
use docflow::store::{
    Department, DocumentStore, InMemoryDocStore, NewDocument, Role, User, UserStatus,
};
use docflow::telemetry::{create_workflow_span, generate_correlation_id};
use docflow::workflows::{Decision, DocumentStateMachine, WorkflowTemplates};

#[derive(Parser)]
#[command(name = "docflow")]
#[command(about = "Document approval workflow tracking core")]
#[command(long_about = "docflow routes documents through ordered department workflows with an \
                       append-only approval history. The CLI is an operational harness over the \
                       in-memory store: 'docflow demo' seeds reference data and walks a document \
                       through a full approval path.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed sample data and walk a document end to end through a workflow
    Demo,
    /// Display collection counts and pending documents per department
    Status,
    /// Print the reporting aggregator's output for the seeded data as JSON
    Report,
}

struct Seeded {
    store: Arc<InMemoryDocStore>,
    promoter: User,
    registry_controller: User,
    clinical_controller: User,
    admin: User,
}

async fn seed() -> Result<Seeded> {
    let store = Arc::new(InMemoryDocStore::new());

    for (id, name, icon) in [
        ("dept-registry", "Registry", "archive"),
        ("dept-clinical", "Clinical Governance", "stethoscope"),
        ("dept-finance", "Finance", "banknote"),
    ] {
        store
            .upsert_department(Department {
                id: id.to_string(),
                name: name.to_string(),
                icon: icon.to_string(),
            })
            .await?;
    }

    let promoter = User {
        id: "user-promoter".to_string(),
        name: "Naledi Mokoena".to_string(),
        email: "naledi@example.org".to_string(),
        persal_id: "10000001".to_string(),
        role: Role::HealthPromoter,
        department_id: None,
        status: UserStatus::Active,
    };
    let registry_controller = User {
        id: "user-registry".to_string(),
        name: "Sipho Dlamini".to_string(),
        email: "sipho@example.org".to_string(),
        persal_id: "10000002".to_string(),
        role: Role::SubDistrict1AController,
        department_id: Some("dept-registry".to_string()),
        status: UserStatus::Active,
    };
    let clinical_controller = User {
        id: "user-clinical".to_string(),
        name: "Anita Venter".to_string(),
        email: "anita@example.org".to_string(),
        persal_id: "10000003".to_string(),
        role: Role::SubDistrict2Controller,
        department_id: Some("dept-clinical".to_string()),
        status: UserStatus::Active,
    };
    let admin = User {
        id: "user-admin".to_string(),
        name: "Admin".to_string(),
        email: "admin@example.org".to_string(),
        persal_id: "10000004".to_string(),
        role: Role::Administrator,
        department_id: None,
        status: UserStatus::Active,
    };
    for user in [&promoter, &registry_controller, &clinical_controller, &admin] {
        store.insert_user(user.clone()).await?;
    }

    Ok(Seeded {
        store,
        promoter,
        registry_controller,
        clinical_controller,
        admin,
    })
}

async fn run_demo(seeded: &Seeded) -> Result<()> {
    let store = &seeded.store;
    let templates = WorkflowTemplates::new(Arc::clone(store));
    let machine = DocumentStateMachine::new(Arc::clone(store));

    let draft = store
        .insert_document(NewDocument {
            name: "Community outreach plan".to_string(),
            doc_type: "PDF".to_string(),
            content: "Q3 outreach schedule for sub-district 1A".to_string(),
            file_url: "file-outreach-plan".to_string(),
            initiator_id: seeded.promoter.id.clone(),
            initiator_name: seeded.promoter.name.clone(),
        })
        .await?;
    println!("draft created: {} ({})", draft.name, draft.id);

    let correlation_id = generate_correlation_id();
    let span = create_workflow_span(
        "demo_walkthrough",
        Some(&draft.id),
        None,
        Some(&correlation_id),
    );
    let _guard = span.enter();

    let (workflow, bound) = templates
        .create_and_bind(
            &draft.id,
            "Routes outreach plans through registry and clinical review",
            vec!["dept-registry".to_string(), "dept-clinical".to_string()],
            &seeded.promoter,
        )
        .await?;
    println!(
        "workflow '{}' bound, pending at {}",
        workflow.name, bound.document.pending_department_id
    );

    let approved = machine
        .decide(
            &draft.id,
            Decision::Approve,
            "Registered and archived",
            &seeded.registry_controller,
        )
        .await?;
    println!(
        "registry approved, now pending at {}",
        approved.document.pending_department_id
    );

    let done = machine
        .decide(
            &draft.id,
            Decision::Approve,
            "Clinically sound",
            &seeded.clinical_controller,
        )
        .await?;
    println!(
        "clinical approved, document status: {:?}, history entries: {}",
        done.document.status,
        done.document.history.len()
    );
    Ok(())
}

async fn run_status(seeded: &Seeded) -> Result<()> {
    run_demo(seeded).await?;
    let store = &seeded.store;
    let departments = store.list_departments().await?;
    let workflows = store.list_workflows().await?;
    let documents = store.list_documents().await?;
    let users = store.list_users().await?;
    println!(
        "departments: {}, workflows: {}, documents: {}, users: {}",
        departments.len(),
        workflows.len(),
        documents.len(),
        users.len()
    );
    for department in &departments {
        let pending = documents
            .iter()
            .filter(|d| d.pending_department_id == department.id)
            .count();
        println!("  {}: {} pending", department.name, pending);
    }
    Ok(())
}

async fn run_report(seeded: &Seeded) -> Result<()> {
    run_demo(seeded).await?;
    let store = &seeded.store;
    let documents = store.list_documents().await?;
    let workflows = store.list_workflows().await?;
    let departments = store.list_departments().await?;
    let opts = docflow::config::config()?.report_options();
    let report = docflow::build_report(&documents, &workflows, &departments, &seeded.admin, &opts);
    println!("{}", serde_json::to_string_pretty(&report)?);

    // Visibility sanity line: what each seeded user would see on a dashboard.
    for user in [&seeded.promoter, &seeded.registry_controller] {
        let query = policy::dashboard_query(user);
        let visible = store.query_documents(&query).await?;
        println!("dashboard for {}: {} document(s)", user.name, visible.len());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    docflow::config::init_config()?;
    if docflow::config::config()?.observability.tracing_enabled {
        docflow::telemetry::init_telemetry()?;
    }

    let cli = Cli::parse();
    let seeded = seed().await?;

    match cli.command {
        Some(Commands::Demo) | None => run_demo(&seeded).await?,
        Some(Commands::Status) => run_status(&seeded).await?,
        Some(Commands::Report) => run_report(&seeded).await?,
    }

    docflow::telemetry::shutdown_telemetry();
    Ok(())
}
