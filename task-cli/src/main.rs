use clap::error::{ContextKind, ErrorKind};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use task_cli::config::Config;
use task_cli::{Error, JsonFileStore, Status, Task, TaskId, TaskTracker};
use tracing::debug;

/// Task CLI - Simple Task Management
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Configuration file to read instead of task-cli.toml next to the executable
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Add a task
    Add { description: String },
    /// Update an existing task
    Update { id: String, description: String },
    /// Delete a task
    Delete { id: String },
    /// Mark task as 'In Progress'
    Progress { id: String },
    /// Mark task as 'Done'
    Done { id: String },
    /// List all tasks, optionally only those with the given status
    List {
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[command(flatten)]
        output: Output,
    },
    /// List all done tasks
    ListDone {
        #[command(flatten)]
        output: Output,
    },
    /// List tasks in progress
    ListProgress {
        #[command(flatten)]
        output: Output,
    },
    /// List pending tasks
    ListPending {
        #[command(flatten)]
        output: Output,
    },
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct Output {
    /// Print the tasks as a JSON array
    #[arg(long)]
    json: bool,
}

const HELP_HINT: &str = "Use \"task-cli help\" to see the list of available commands.";

fn main() -> anyhow::Result<()> {
    let args = parse_args().map_err(|err| anyhow::anyhow!("{err}\nUsage: {HELP_HINT}"))?;

    let config = Config::load(args.config.as_deref())?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(config.log_level()?)
        .init();

    let store = JsonFileStore::new(config.store_path()?);
    debug!(path = %store.path().display(), "using task file");
    let tracker = TaskTracker::new(&store);

    match run(&tracker, args.command) {
        Err(err @ Error::CorruptStore { .. }) => {
            if let Some(backup) = store.recover(config.on_corrupt)? {
                eprintln!("The unreadable task file was moved to {}", backup.display());
            }
            Err(err.into())
        }
        result => Ok(result?),
    }
}

/// Parses the command line, turning clap's failures into task errors.
fn parse_args() -> Result<Cli, Error> {
    Cli::try_parse().or_else(|err| match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => err.exit(),
        kind => Err(usage_error(&err, kind)),
    })
}

fn usage_error(err: &clap::Error, kind: ErrorKind) -> Error {
    match kind {
        ErrorKind::InvalidSubcommand => {
            let command = err
                .get(ContextKind::InvalidSubcommand)
                .map(ToString::to_string)
                .unwrap_or_default();
            Error::UnrecognizedCommand(command)
        }
        _ => Error::InvalidInput(clap_message(err)),
    }
}

/// Clap's message without its `error:` prefix, usage block and help hint.
fn clap_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let message = rendered.split("\n\n").next().unwrap_or_default();
    message
        .trim_start_matches("error: ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn run(tracker: &TaskTracker<JsonFileStore>, command: Commands) -> task_cli::Result<()> {
    match command {
        Commands::Add { description } => {
            let id = tracker.add(&description)?;
            println!("Task added: {id}");
        }
        Commands::Update { id, description } => {
            let id = TaskId::from(id.as_str());
            tracker.update(&id, &description)?;
            println!("Task updated: {id}");
        }
        Commands::Delete { id } => {
            let id = TaskId::from(id.as_str());
            tracker.delete(&id)?;
            println!("Task deleted: {id}");
        }
        Commands::Progress { id } => {
            let id = TaskId::from(id.as_str());
            tracker.mark_in_progress(&id)?;
            println!("Task marked as in progress: {id}");
        }
        Commands::Done { id } => {
            let id = TaskId::from(id.as_str());
            tracker.mark_done(&id)?;
            println!("Task marked as done: {id}");
        }
        Commands::List { status, output } => {
            let tasks = match status {
                Some(status) => tracker.list_by_status(status)?,
                None => tracker.list_all()?,
            };
            print_tasks(&tasks, output)?;
        }
        Commands::ListDone { output } => {
            print_tasks(&tracker.list_by_status(Status::Done)?, output)?
        }
        Commands::ListProgress { output } => {
            print_tasks(&tracker.list_by_status(Status::InProgress)?, output)?
        }
        Commands::ListPending { output } => {
            print_tasks(&tracker.list_by_status(Status::Pending)?, output)?
        }
    };

    Ok(())
}

fn print_tasks(tasks: &[Task], output: Output) -> task_cli::Result<()> {
    if output.json {
        println!("{}", serde_json::to_string_pretty(tasks)?);
    } else if tasks.is_empty() {
        println!("No tasks found.");
    } else {
        for task in tasks {
            println!("{task}");
        }
    }
    Ok(())
}
