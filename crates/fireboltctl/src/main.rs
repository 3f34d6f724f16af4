use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use fireboltctl_core::Config;
use tracing::{debug, error, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands, EngineCommands};
use connection::ConnectionManager;
use error::Result as CliResult;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    let result = match load_connection_manager(&cli) {
        Ok(conn_mgr) => execute_command(&cli, &conn_mgr).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        e.print_diagnostic();
        std::process::exit(e.exit_code());
    }
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "fireboltctl=warn,fireboltctl_core=warn",
            1 => "fireboltctl=info,fireboltctl_core=info",
            2 => "fireboltctl=debug,fireboltctl_core=debug",
            _ => "fireboltctl=trace,fireboltctl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

/// Load configuration from the explicit path or the default location
fn load_connection_manager(cli: &Cli) -> CliResult<ConnectionManager> {
    let (config, config_path) = if let Some(config_file) = &cli.config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        let config = Config::load_from_path(&path)?;
        (config, Some(path))
    } else {
        debug!("Loading config from default location");
        (Config::load()?, None)
    };

    Ok(ConnectionManager::with_config_path(config, config_path))
}

async fn execute_command(cli: &Cli, conn_mgr: &ConnectionManager) -> CliResult<()> {
    // Log command execution with sanitized parameters
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));
    debug!(
        "Config path: {:?}, {} profile(s) loaded",
        conn_mgr.config_path,
        conn_mgr.config.profiles.len()
    );

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Execute(args) => commands::query::handle_execute(args, conn_mgr, cli).await,
        Commands::Store(args) => commands::query::handle_store(args, conn_mgr, cli).await,
        Commands::Engine(engine_cmd) => {
            commands::engine::handle_engine_command(engine_cmd, conn_mgr, cli).await
        }
        Commands::Completions { shell } => {
            debug!("Generating completions for {:?}", shell);
            generate_completions(*shell);
            Ok(())
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Generate shell completions
fn generate_completions(shell: cli::Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        cli::Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, name, &mut std::io::stdout())
        }
        cli::Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut std::io::stdout()),
    }
}

/// Format command for human-readable logging (without query text or secrets)
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Execute(args) => format!(
            "execute on engine {}",
            args.engine_name.as_deref().unwrap_or("<profile>")
        ),
        Commands::Store(args) => format!("store to {}", args.destination_file_name),
        Commands::Engine(cmd) => match cmd {
            EngineCommands::Id { .. } => "engine id".to_string(),
            EngineCommands::Describe { .. } => "engine describe".to_string(),
            EngineCommands::Start { wait, .. } => format!("engine start (wait: {})", wait),
            EngineCommands::Stop { .. } => "engine stop".to_string(),
            EngineCommands::Restart { wait, .. } => format!("engine restart (wait: {})", wait),
            EngineCommands::Wait { status, .. } => format!("engine wait for {}", status),
        },
        Commands::Completions { shell } => format!("completions {:?}", shell),
    }
}
