//! CLI structure and command definitions

use clap::{Args, Parser, Subcommand};
use fireboltctl_core::EngineStatus;

pub use crate::output::OutputFormat;

/// Run queries and manage engines on Firebolt
#[derive(Parser, Debug)]
#[command(name = "fireboltctl")]
#[command(version, about = "Run queries and manage engines on Firebolt")]
#[command(long_about = "
Run queries and manage engines on Firebolt

Credentials are taken from --email/--password, then FIREBOLT_EMAIL and
FIREBOLT_PASSWORD, then the selected profile of the config file.

EXAMPLES:
    # Start the engine if needed and print the raw query response
    fireboltctl execute --database sales --engine-name sales_ingest --query 'SELECT 1'

    # Store a result set as CSV without waiting for the engine
    fireboltctl store --database sales --engine-name sales_ingest \\
        --query 'SELECT * FROM orders' --start-wait-engine false \\
        --destination-folder-name exports --destination-file-name orders.csv

    # Restart an engine and wait until it serves queries again
    fireboltctl engine restart --engine-name sales_ingest --wait

For more help on a specific command, run:
    fireboltctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "FIREBOLT_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "FIREBOLT_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// API origin, e.g. https://api.app.firebolt.io
    #[arg(long, global = true, env = "FIREBOLT_API_URL")]
    pub api_url: Option<String>,

    /// Account email (falls back to FIREBOLT_EMAIL)
    #[arg(long, global = true)]
    pub email: Option<String>,

    /// Account password (falls back to FIREBOLT_PASSWORD)
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Output format for engine commands
    #[arg(long, short = 'o', global = true, value_enum, default_value = "json")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a query and print the raw response body
    #[command(visible_alias = "exec")]
    Execute(QueryArgs),

    /// Run a query and write the result set to a CSV file
    Store(StoreArgs),

    /// Engine lookup and lifecycle
    #[command(subcommand)]
    Engine(EngineCommands),

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Where and what to query
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Database to run the query against (falls back to the profile)
    #[arg(long)]
    pub database: Option<String>,

    /// Engine that runs the query (falls back to the profile)
    #[arg(long)]
    pub engine_name: Option<String>,

    /// Query text, sent as-is
    #[arg(long)]
    pub query: String,

    /// Start the engine and wait for it to serve before querying
    #[arg(
        long,
        default_value = "True",
        value_name = "BOOL",
        action = clap::ArgAction::Set,
        value_parser = parse_bool_flag
    )]
    pub start_wait_engine: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// File name of the CSV output
    #[arg(long)]
    pub destination_file_name: String,

    /// Folder for the CSV output, created if missing
    #[arg(long, default_value = "")]
    pub destination_folder_name: String,

    /// Write a header row with the column names
    #[arg(
        long,
        default_value = "True",
        value_name = "BOOL",
        action = clap::ArgAction::Set,
        value_parser = parse_bool_flag
    )]
    pub file_header: bool,
}

/// Engine selection shared by the engine subcommands
#[derive(Args, Debug, Clone)]
pub struct EngineTarget {
    /// Engine name (falls back to the profile)
    #[arg(long, conflicts_with = "engine_id")]
    pub engine_name: Option<String>,

    /// Engine id, skipping the name lookup
    #[arg(long)]
    pub engine_id: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum EngineCommands {
    /// Resolve an engine name to its id
    Id {
        /// Engine name (falls back to the profile)
        #[arg(long)]
        engine_name: Option<String>,
    },

    /// Show the engine descriptor
    #[command(visible_alias = "get")]
    Describe {
        #[command(flatten)]
        target: EngineTarget,
    },

    /// Start the engine
    Start {
        #[command(flatten)]
        target: EngineTarget,

        /// Wait until the engine serves queries
        #[arg(long)]
        wait: bool,
    },

    /// Stop the engine
    Stop {
        #[command(flatten)]
        target: EngineTarget,
    },

    /// Restart the engine
    Restart {
        #[command(flatten)]
        target: EngineTarget,

        /// Wait until the engine serves queries
        #[arg(long)]
        wait: bool,
    },

    /// Wait until the engine reports a status
    Wait {
        #[command(flatten)]
        target: EngineTarget,

        /// running, starting, idle, or a raw ENGINE_STATUS_* value
        #[arg(long, default_value = "running", value_parser = parse_engine_status)]
        status: EngineStatus,
    },
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Friendly Interactive Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    /// Elvish
    Elvish,
}

/// Only `True`, `true` and `TRUE` are true; every other value is false
pub fn parse_bool_flag(value: &str) -> Result<bool, String> {
    Ok(matches!(value, "True" | "true" | "TRUE"))
}

/// Accept the short status names as well as raw wire values
pub fn parse_engine_status(value: &str) -> Result<EngineStatus, String> {
    if value.trim().is_empty() {
        return Err("status must not be empty".to_string());
    }

    Ok(match value.to_ascii_lowercase().as_str() {
        "running" => EngineStatus::Running,
        "starting" => EngineStatus::Starting,
        "idle" => EngineStatus::Idle,
        _ => EngineStatus::from_raw(value),
    })
}
