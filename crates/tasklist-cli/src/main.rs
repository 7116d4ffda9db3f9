//! tasklist CLI
//!
//! Command-line front end for the task store: list, add, toggle and delete
//! tasks backed by the remote todos API and a local cache.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tasklist_core::{TaskId, TaskStore};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "tasklist - todo list synced with a remote API and cached locally")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Debug logging to stderr (overridden by TASKLIST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all tasks (default)
    #[command(alias = "ls")]
    List,
    /// Show one task
    Show {
        /// Task ID
        id: TaskId,
    },
    /// Add a task
    Add {
        /// Task title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
    /// Toggle a task between open and done
    Toggle {
        /// Task ID
        id: TaskId,
    },
    /// Delete a task
    #[command(alias = "rm")]
    Delete {
        /// Task ID
        id: TaskId,
    },
    /// Replace local tasks with the remote list
    Fetch,
    /// Show storage, remote and operation status
    ///
    /// Loading flags and errors cover this invocation only; they are not
    /// persisted between runs.
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, api_url, storage_backend, owner_id, fetch_limit, request_timeout_secs)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    let command = cli.command.unwrap_or(Commands::List);

    // Config commands don't need the store
    if let Commands::Config { command } = &command {
        return match command {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key.clone(), value.clone(), config_path, &output)
            }
        };
    }

    let config = commands::config::load(config_path)?;
    let store = TaskStore::open(&config)?;

    // Fetch restores the cache itself so the remote list is requested once
    if !matches!(command, Commands::Fetch) {
        if let Err(e) = store.load_from_storage().await {
            output.warning(&format!("Could not load tasks: {}", e));
        }
    }

    let result = match command {
        Commands::List => commands::task::list(&store, &output),
        Commands::Show { id } => commands::task::show(&store, id, &output),
        Commands::Add { title } => commands::task::add(&store, title, &output).await,
        Commands::Toggle { id } => commands::task::toggle(&store, id, &output).await,
        Commands::Delete { id } => commands::task::delete(&store, id, &output).await,
        Commands::Fetch => commands::task::fetch(&store, &output).await,
        Commands::Status => commands::status::show(&store, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    };

    // Writes are fire-and-forget; wait for them before the runtime exits
    store.flush().await;

    result
}

/// Log to stderr; TASKLIST_LOG takes an EnvFilter directive
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "tasklist_core=debug,tasklist=debug"
    } else {
        "warn"
    };
    let env_filter = EnvFilter::try_from_env("TASKLIST_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
