use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use labtrack::commands::*;
use labtrack::models::{FieldworkStatus, TaskStatus};
use labtrack::storage::Store;
use labtrack::tui::run_tui;
use labtrack::{Priority, SystemClock, DEFAULT_UPCOMING_DAYS};

/// Environment variable holding the tracing filter.
const LOG_ENV: &str = "LABTRACK_LOG";

#[derive(Parser)]
#[command(name = "labtrack", version)]
#[command(about = "Lab tasks, permits and fieldwork, sorted by urgency", long_about = None)]
struct Cli {
    /// Data directory (overrides LABTRACK_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Manage research permits
    Permit {
        #[command(subcommand)]
        command: PermitCommands,
    },
    /// Manage fieldwork trips
    Fieldwork {
        #[command(subcommand)]
        command: FieldworkCommands,
    },
    /// Summarise what needs attention
    Status {
        /// Fieldwork look-ahead in days
        #[arg(short, long, default_value_t = DEFAULT_UPCOMING_DAYS)]
        days: i64,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
    /// Open interactive dashboard
    Ui,
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Add a new task
    Add {
        /// Task name (quoted if it has spaces)
        name: String,
        #[arg(short, long, default_value = "p3", value_parser = ["p1", "p2", "p3", "p4"])]
        priority: String,
        /// Due date in YYYY-MM-DD
        #[arg(short, long)]
        due: Option<String>,
        #[arg(long)]
        project: Option<String>,
        /// research, teaching, grants, grad-mentorship, undergrad-mentorship, admin, misc
        #[arg(long)]
        category: Option<String>,
    },
    /// List tasks, most urgent first
    List {
        /// Show done tasks
        #[arg(short, long)]
        all: bool,
        /// Only the N most urgent open tasks
        #[arg(short, long, value_name = "N")]
        focus: Option<usize>,
    },
    /// Mark a task as done
    Done { id: u64 },
    /// Mark a task as in progress
    Start { id: u64 },
    /// Remove a task
    Remove { id: u64 },
    /// Edit a task
    Edit {
        id: u64,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long, value_parser = ["p1", "p2", "p3", "p4"])]
        priority: Option<String>,
        /// New due date in YYYY-MM-DD
        #[arg(short, long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Drop the due date
        #[arg(long)]
        clear_due: bool,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Subcommand)]
enum PermitCommands {
    /// Add a permit
    Add {
        title: String,
        /// Permit type, e.g. IRB, IACUC, collection
        #[arg(short, long)]
        kind: Option<String>,
        #[arg(short, long)]
        number: Option<String>,
        #[arg(long)]
        project: Option<String>,
        /// Expiration date in YYYY-MM-DD
        #[arg(short, long)]
        expires: Option<String>,
        /// Renewal warning window in days (default 60)
        #[arg(short, long)]
        reminder: Option<i64>,
    },
    /// List permits by expiry
    List {
        /// Warning window applied to every permit
        #[arg(short, long)]
        warning_days: Option<i64>,
    },
    /// Remove a permit
    Remove { id: u64 },
}

#[derive(Subcommand)]
enum FieldworkCommands {
    /// Schedule a fieldwork trip
    Add {
        title: String,
        #[arg(short, long)]
        site: Option<String>,
        #[arg(long)]
        project: Option<String>,
        /// First day in YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,
        /// Last day in YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,
    },
    /// List fieldwork by start date
    List {
        /// Only trips starting within DAYS days
        #[arg(short, long, value_name = "DAYS")]
        upcoming: Option<i64>,
    },
    /// Set a trip's status (planned, active, completed, cancelled)
    Status { id: u64, status: FieldworkStatus },
    /// Remove a trip
    Remove { id: u64 },
}

fn run(cli: Cli) -> Result<()> {
    let store = match cli.data_dir {
        Some(dir) => Store::at(dir),
        None => Store::open_default(),
    };
    let clock = SystemClock;
    tracing::debug!(dir = %store.dir().display(), "using data directory");

    match cli.command {
        Some(Commands::Task { command }) => match command {
            TaskCommands::Add { name, priority, due, project, category } => {
                cmd_task_add(&store, name, Priority::from(priority), due.as_deref(), project, category, false)
                    .map(|_| ())
            }
            TaskCommands::List { all, focus } => cmd_task_list(&store, &clock, all, focus),
            TaskCommands::Done { id } => cmd_task_set_status(&store, id, TaskStatus::Done, false),
            TaskCommands::Start { id } => cmd_task_set_status(&store, id, TaskStatus::Progress, false),
            TaskCommands::Remove { id } => cmd_task_remove(&store, id, false),
            TaskCommands::Edit { id, name, priority, due, clear_due, project, category } => {
                let edit = TaskEdit {
                    name,
                    priority: priority.map(Priority::from),
                    due,
                    clear_due,
                    project,
                    category,
                };
                cmd_task_edit(&store, id, edit, false)
            }
        },
        Some(Commands::Permit { command }) => match command {
            PermitCommands::Add { title, kind, number, project, expires, reminder } => {
                cmd_permit_add(&store, title, kind, number, project, expires.as_deref(), reminder, false)
                    .map(|_| ())
            }
            PermitCommands::List { warning_days } => cmd_permit_list(&store, &clock, warning_days),
            PermitCommands::Remove { id } => cmd_permit_remove(&store, id, false),
        },
        Some(Commands::Fieldwork { command }) => match command {
            FieldworkCommands::Add { title, site, project, start, end } => {
                cmd_fieldwork_add(&store, title, site, project, start.as_deref(), end.as_deref(), false)
                    .map(|_| ())
            }
            FieldworkCommands::List { upcoming } => cmd_fieldwork_list(&store, &clock, upcoming),
            FieldworkCommands::Status { id, status } => cmd_fieldwork_status(&store, id, status, false),
            FieldworkCommands::Remove { id } => cmd_fieldwork_remove(&store, id, false),
        },
        Some(Commands::Status { days }) => cmd_status(&store, &clock, days),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "labtrack", &mut io::stdout());
            Ok(())
        }
        Some(Commands::Ui) | None => run_tui(store),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
