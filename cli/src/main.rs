//! Nomos CLI
//!
//! Operator command line for the Nomos decision engine. State lives in a
//! JSON snapshot that every command loads and writes back.
//!
//! # Usage
//!
//! ```bash
//! nomos org institution add "Cooperativa Central"
//! nomos config set institution_id <id>
//! nomos scope add --area <id> --name "Conciliação bancária" -p 4 -i 5 --period trimestral --start-month Fevereiro
//! nomos scope plan <scope-id>
//! nomos exec record --scope <id> --entry <id> --sample 100 --non-conforming 70
//! nomos dashboard compliance --format json
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "nomos")]
#[command(author = "Nomos")]
#[command(version = "0.1.0")]
#[command(about = "Nomos Risk & Compliance Command Line Interface", long_about = None)]
struct Cli {
    /// Snapshot file (defaults to ~/.nomos/store.json)
    #[arg(long, env = "NOMOS_SNAPSHOT")]
    snapshot: Option<String>,

    /// Institution to operate on
    #[arg(long, env = "NOMOS_INSTITUTION")]
    institution: Option<String>,

    /// Output format
    #[arg(long, short)]
    format: Option<output::OutputFormat>,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the organization hierarchy
    Org {
        #[command(subcommand)]
        action: OrgCommands,
    },
    /// Score inherent risk
    Risk {
        #[command(subcommand)]
        action: RiskCommands,
    },
    /// Manage the tenant matrix configuration
    Matrix {
        #[command(subcommand)]
        action: MatrixCommands,
    },
    /// Manage scope items and their schedule
    Scope {
        #[command(subcommand)]
        action: ScopeCommands,
    },
    /// Record and inspect test executions
    Exec {
        #[command(subcommand)]
        action: ExecCommands,
    },
    /// Manage remediation workflows (action plans)
    Plan {
        #[command(subcommand)]
        action: PlanCommands,
    },
    /// View dashboards
    Dashboard {
        #[command(subcommand)]
        action: DashboardCommands,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum OrgCommands {
    /// Manage institutions
    Institution {
        #[command(subcommand)]
        action: InstitutionCommands,
    },
    /// Add a directorate to the institution
    Directorate { name: String },
    /// Add an area to a directorate
    Area {
        #[arg(long)]
        directorate: String,
        name: String,
    },
    /// Add a cost center to the institution
    CostCenter {
        #[arg(long)]
        code: Option<String>,
        name: String,
    },
    /// List cost centers of the institution
    CostCenters,
    /// List areas with their directorates
    Units,
}

#[derive(Subcommand)]
enum InstitutionCommands {
    /// Create an institution
    Add { name: String },
    /// List institutions
    List,
}

#[derive(Subcommand)]
enum RiskCommands {
    /// Score a probability × impact pair
    Score {
        #[arg(short, long)]
        probability: u8,
        #[arg(short, long)]
        impact: u8,
    },
}

#[derive(Subcommand)]
enum MatrixCommands {
    /// Print the stored document (or the built-in default)
    Show,
    /// Replace the document from a JSON file
    Set {
        #[arg(short, long)]
        file: String,
    },
    /// Resolve compliance band and action
    Resolve {
        #[arg(long)]
        percentage: rust_decimal::Decimal,
        /// LOW, MEDIUM, HIGH or a tenant label
        #[arg(long)]
        tier: String,
    },
}

/// Scope item fields shared by add and update
#[derive(clap::Args)]
struct ScopeArgs {
    #[arg(long)]
    area: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    purpose: Option<String>,
    #[arg(long)]
    cost_center: Option<String>,
    #[arg(long)]
    area_tag: Option<String>,
    #[arg(long)]
    procedures: Option<String>,
    /// mensal, bimestral, trimestral, semestral, anual
    #[arg(long, default_value = "nenhuma")]
    period: String,
    #[arg(long, default_value = "Janeiro")]
    start_month: String,
    #[arg(long)]
    normative_basis: Option<String>,
    #[arg(short, long, default_value_t = 1)]
    probability: u8,
    #[arg(short, long, default_value_t = 1)]
    impact: u8,
}

#[derive(Subcommand)]
enum ScopeCommands {
    /// Create a scope item
    Add(ScopeArgs),
    /// List scope items of the institution
    List,
    /// Show one scope item
    Show { id: String },
    /// Replace a scope item's fields
    Update {
        id: String,
        #[command(flatten)]
        fields: ScopeArgs,
    },
    /// Change only probability and impact
    Rescore {
        id: String,
        #[arg(short, long)]
        probability: u8,
        #[arg(short, long)]
        impact: u8,
    },
    /// Delete a scope item with its schedule, executions and workflows
    Delete { id: String },
    /// Regenerate the yearly schedule
    Plan {
        id: String,
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Subcommand)]
enum ExecCommands {
    /// Record a test result
    Record {
        #[arg(long)]
        scope: String,
        #[arg(long)]
        entry: String,
        #[arg(long)]
        sample: u32,
        #[arg(long)]
        non_conforming: u32,
        /// Non-conformities found
        #[arg(long)]
        findings: Option<String>,
        /// Action used when the matrix prescribes none
        #[arg(long)]
        action: Option<String>,
        #[arg(long, default_value = "operator")]
        responsible: String,
    },
    /// List executions
    List {
        #[arg(long)]
        scope: Option<String>,
    },
    /// Show one execution with its compliance band
    Show { id: String },
    /// Schedule of the institution with results
    Schedule,
}

#[derive(Subcommand)]
enum PlanCommands {
    /// Create a workflow
    Create {
        #[arg(long)]
        execution: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "operator")]
        by: String,
        /// "description|responsible|YYYY-MM-DD", repeatable
        #[arg(long = "step")]
        steps: Vec<String>,
    },
    /// List workflows, newest first
    List,
    /// Show a workflow
    Show { id: String },
    /// Set the description
    Describe { id: String, text: String },
    /// Add a step
    StepAdd {
        id: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        responsible: Option<String>,
        #[arg(long)]
        due: Option<String>,
    },
    /// Flip a step's done flag
    StepToggle { id: String, step: String },
    /// Remove a step
    StepRemove { id: String, step: String },
    /// Post a message, optionally with attachments
    Message {
        id: String,
        text: String,
        #[arg(long, default_value = "operator")]
        author: String,
        #[arg(long = "attach")]
        attachments: Vec<String>,
    },
    /// Save an attachment to a file
    Download {
        id: String,
        attachment: String,
        #[arg(short, long)]
        output: String,
    },
    /// Complete a workflow
    Finalize { id: String },
    /// Delete a workflow
    Delete { id: String },
}

#[derive(Subcommand)]
enum DashboardCommands {
    /// Conformity statistics
    Compliance {
        #[arg(long)]
        directorate: Option<String>,
        #[arg(long)]
        area: Option<String>,
    },
    /// Workflow statistics
    Workflows {
        #[arg(long)]
        directorate: Option<String>,
        #[arg(long)]
        area: Option<String>,
    },
    /// Home summary
    Home,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Show configuration
    Show,
    /// Initialize configuration
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = config::Config::load(cli.profile.as_deref()).unwrap_or_default();

    let result = match cli.command {
        Commands::Config { action } => commands::config::handle(action, cli.profile.as_deref()),
        command => run(command, cli.snapshot, cli.institution, cli.format, config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    snapshot: Option<String>,
    institution: Option<String>,
    format: Option<output::OutputFormat>,
    config: config::Config,
) -> Result<(), String> {
    let session = commands::Session::open(snapshot, institution, format, config)?;
    match command {
        Commands::Org { action } => commands::org::handle(action, &session).await?,
        Commands::Risk { action } => commands::risk::handle(action, &session)?,
        Commands::Matrix { action } => commands::matrix::handle(action, &session).await?,
        Commands::Scope { action } => commands::scope::handle(action, &session).await?,
        Commands::Exec { action } => commands::exec::handle(action, &session).await?,
        Commands::Plan { action } => commands::plan::handle(action, &session).await?,
        Commands::Dashboard { action } => commands::dashboard::handle(action, &session).await?,
        Commands::Config { .. } => {}
    }
    session.persist()
}
