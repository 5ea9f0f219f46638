use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use doable_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};

mod commands;

/// Doable - set up a conda toolchain and build, lint, test and document a project
#[derive(Parser)]
#[command(name = "doable")]
#[command(about = "A small dependency-aware task runner")]
#[command(version)]
struct Cli {
    /// Path to the workspace root (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Path to the config file (defaults to <workspace>/doable.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered tasks
    List,
    /// Show everything a task declares
    Info {
        /// Task name
        task: String,
    },
    /// Show the execution plan without running anything
    Plan {
        /// Treat every task as out of date
        #[arg(short, long)]
        force: bool,
        /// Task names, each optionally followed by its parameters.
        /// `--force` may also appear here; arguments after `--` all go to the tasks
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run tasks and their dependencies
    Run {
        /// Run tasks even when they are up to date
        #[arg(short, long)]
        force: bool,
        /// 0 captures all output, 1 captures stdout, 2 shows everything
        #[arg(short, long)]
        verbosity: Option<u8>,
        /// Task names, each optionally followed by its parameters.
        /// `--force` and `--verbosity` may also appear here; arguments after `--`
        /// all go to the tasks
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Show the task dependency graph
    Graph,
    /// Forget recorded state so tasks are re-checked from scratch
    Forget {
        /// Task to forget (all tasks when omitted)
        task: Option<String>,
    },
    /// Remove the targets of tasks
    Clean {
        /// Tasks to clean (all tasks when omitted)
        tasks: Vec<String>,
    },
    /// Print the JSON schema of doable.yml
    Schema,
}

/// Runner flags pulled out of the trailing task arguments
#[derive(Debug, Default, PartialEq, Eq)]
struct TaskArgs {
    force: bool,
    verbosity: Option<u8>,
    args: Vec<String>,
}

impl TaskArgs {
    /// Separate `--force`/`-f` (and `--verbosity`/`-v` when `with_verbosity`)
    /// from task names and parameters. A bare `--` ends flag scanning and is
    /// dropped; everything after it is passed to the tasks untouched.
    fn extract(raw: Vec<String>, with_verbosity: bool) -> Result<Self> {
        let mut parsed = TaskArgs::default();
        let mut iter = raw.into_iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--" => {
                    parsed.args.extend(iter.by_ref());
                    break;
                }
                "--force" | "-f" => parsed.force = true,
                "--verbosity" | "-v" if with_verbosity => {
                    let value = iter
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("'{}' requires a value", arg))?;
                    parsed.verbosity = Some(parse_verbosity(&value)?);
                }
                _ => match arg.strip_prefix("--verbosity=") {
                    Some(value) if with_verbosity => {
                        parsed.verbosity = Some(parse_verbosity(value)?)
                    }
                    _ => parsed.args.push(arg),
                },
            }
        }

        Ok(parsed)
    }
}

fn parse_verbosity(value: &str) -> Result<u8> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid verbosity '{}'", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(workspace = %cli.workspace.display(), "starting");

    // The schema does not need a workspace
    if let Commands::Schema = cli.command {
        return commands::schema::execute();
    }

    let manager = WorkspaceManager::new(WorkspaceManagerConfig {
        workspace_root: cli.workspace,
        config_path: cli.config,
        platform: None,
    })
    .map_err(|e| anyhow::anyhow!("Failed to initialize workspace: {}", e))?;

    match cli.command {
        Commands::List => commands::list::execute(&manager),
        Commands::Info { task } => commands::info::execute(&manager, &task),
        Commands::Plan { force, args } => {
            let task_args = TaskArgs::extract(args, false)?;
            commands::plan::execute(&manager, &task_args.args, force || task_args.force)
        }
        Commands::Run {
            force,
            verbosity,
            args,
        } => {
            let task_args = TaskArgs::extract(args, true)?;
            commands::run::execute(
                &manager,
                &task_args.args,
                force || task_args.force,
                task_args.verbosity.or(verbosity),
            )
            .await
        }
        Commands::Graph => commands::graph::execute(&manager),
        Commands::Forget { task } => commands::forget::execute(&manager, task.as_deref()),
        Commands::Clean { tasks } => commands::clean::execute(&manager, &tasks),
        Commands::Schema => commands::schema::execute(),
    }
}
