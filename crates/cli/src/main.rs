use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use closure_task_core::task_manager::{TaskManager, TaskManagerConfig};
use tracing_subscriber::EnvFilter;

mod commands;

/// closure-task - Run Google Closure Compiler over configured targets
#[derive(Parser)]
#[command(name = "closure-task")]
#[command(about = "Run Google Closure Compiler once per configured file group")]
#[command(version)]
struct Cli {
    /// Path to the workspace root (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file (defaults to closure-task.yml in the workspace root)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Echo compiler command lines and enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured tasks and their targets
    List,
    /// Show the compiler invocations a run would start, without running them
    Plan {
        /// Target in format "task:target" or just "task" for all targets
        target: String,
    },
    /// Run a task
    Run {
        /// Target in format "task:target" or just "task" for all targets
        target: String,
        /// Keep running the remaining targets after a failure
        #[arg(long)]
        force: bool,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // The schema does not need a workspace
    if let Commands::Schema = cli.command {
        return commands::schema::execute();
    }

    // Initialize task manager with all business logic
    let manager = TaskManager::new(TaskManagerConfig {
        workspace_root: cli.workspace,
        config_path: cli.config,
    })
    .map_err(|e| anyhow::anyhow!("Failed to initialize workspace: {}", e))?;
    tracing::debug!(root = %manager.root.display(), "Loaded workspace configuration");

    // Execute command (CLI layer only handles presentation)
    match cli.command {
        Commands::List => commands::list::execute(&manager),
        Commands::Plan { target } => commands::plan::execute(&manager, &target),
        Commands::Run { target, force } => {
            commands::run::execute(&manager, &target, force, cli.verbose).await
        }
        Commands::Schema => commands::schema::execute(),
    }
}
