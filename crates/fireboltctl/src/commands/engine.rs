//! Engine commands and the engine preparation shared with the query commands

use std::time::Duration;

use fireboltctl_core::{Client, Engine, EngineAction, EngineStatus, ProgressCallback, ProgressEvent};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{debug, info};

use crate::cli::{Cli, EngineCommands, EngineTarget};
use crate::connection::ConnectionManager;
use crate::error::{CliError, Result as CliResult};
use crate::output::print_output;

pub async fn handle_engine_command(
    cmd: &EngineCommands,
    conn_mgr: &ConnectionManager,
    cli: &Cli,
) -> CliResult<()> {
    match cmd {
        EngineCommands::Id { engine_name } => {
            let name = conn_mgr.engine_name(cli, engine_name.as_deref())?;
            let client = conn_mgr.create_client(cli).await?;
            let engine_id = client.get_engine_id(&name).await?;
            print_output(
                json!({"engine_name": name, "engine_id": engine_id}),
                cli.output,
            )?;
        }
        EngineCommands::Describe { target } => {
            let client = conn_mgr.create_client(cli).await?;
            let engine_id = resolve_engine_id(&client, conn_mgr, cli, target).await?;
            let engine = client.describe_engine(&engine_id).await?;
            print_output(&engine, cli.output)?;
        }
        EngineCommands::Start { target, wait } => {
            run_lifecycle(conn_mgr, cli, target, EngineAction::Start, *wait).await?;
        }
        EngineCommands::Stop { target } => {
            run_lifecycle(conn_mgr, cli, target, EngineAction::Stop, false).await?;
        }
        EngineCommands::Restart { target, wait } => {
            run_lifecycle(conn_mgr, cli, target, EngineAction::Restart, *wait).await?;
        }
        EngineCommands::Wait { target, status } => {
            let client = conn_mgr.create_client(cli).await?;
            let engine_id = resolve_engine_id(&client, conn_mgr, cli, target).await?;
            let engine = wait_with_spinner(&client, &engine_id, status).await?;
            print_output(&engine, cli.output)?;
        }
    }

    Ok(())
}

async fn run_lifecycle(
    conn_mgr: &ConnectionManager,
    cli: &Cli,
    target: &EngineTarget,
    action: EngineAction,
    wait: bool,
) -> CliResult<()> {
    let client = conn_mgr.create_client(cli).await?;
    let engine_id = resolve_engine_id(&client, conn_mgr, cli, target).await?;

    let mut engine = client.engine_lifecycle(&engine_id, action).await?;
    if wait {
        engine = wait_with_spinner(&client, &engine_id, &EngineStatus::Running).await?;
    }

    print_output(&engine, cli.output)?;
    Ok(())
}

async fn resolve_engine_id(
    client: &Client,
    conn_mgr: &ConnectionManager,
    cli: &Cli,
    target: &EngineTarget,
) -> CliResult<String> {
    if let Some(id) = &target.engine_id {
        return Ok(id.clone());
    }

    let name = conn_mgr.engine_name(cli, target.engine_name.as_deref())?;
    Ok(client.get_engine_id(&name).await?)
}

/// Look up an engine's query endpoint, starting it first when asked to.
///
/// The engine is always described before any start request. With
/// `start_wait` the engine is started and polled until it is running; the
/// endpoint from that final descriptor wins when it has one.
pub async fn prepare_engine(
    client: &Client,
    engine_name: &str,
    start_wait: bool,
) -> CliResult<String> {
    let engine_id = client.get_engine_id(engine_name).await?;
    let mut engine = client.describe_engine(&engine_id).await?;
    debug!(
        "Engine {} ({}) is {}",
        engine_name, engine_id, engine.current_status
    );

    if start_wait {
        client.start_engine(&engine_id).await?;
        let running = wait_with_spinner(client, &engine_id, &EngineStatus::Running).await?;
        if running.endpoint().is_some() {
            engine = running;
        }
    }

    engine
        .endpoint()
        .map(str::to_string)
        .ok_or_else(|| CliError::NoEndpoint {
            name: engine_name.to_string(),
        })
}

/// Wait for an engine status while a spinner on stderr shows progress
pub async fn wait_with_spinner(
    client: &Client,
    engine_id: &str,
    desired: &EngineStatus,
) -> CliResult<Engine> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Waiting for engine {} to be {}", engine_id, desired));
    pb.enable_steady_tick(Duration::from_millis(120));

    let pb_clone = pb.clone();
    let target = desired.clone();
    let progress_callback: ProgressCallback = Box::new(move |event: ProgressEvent| match event {
        ProgressEvent::Observed {
            engine_id,
            attempt,
            status,
        } => {
            pb_clone.set_message(format!(
                "Engine {}: {} (check {})",
                engine_id, status, attempt
            ));
        }
        ProgressEvent::Waiting { interval, .. } => {
            pb_clone.set_message(format!(
                "{}, next check in {}s",
                pb_clone.message(),
                interval.as_secs()
            ));
        }
        ProgressEvent::Reached {
            engine_id,
            attempts,
        } => {
            pb_clone.finish_with_message(format!(
                "Engine {} is {} after {} check(s)",
                engine_id, target, attempts
            ));
        }
        ProgressEvent::Exhausted {
            engine_id,
            attempts,
            status,
        } => {
            pb_clone.finish_with_message(format!(
                "Engine {} still {} after {} check(s)",
                engine_id, status, attempts
            ));
        }
    });

    let result = client
        .wait_engine_status_with_progress(engine_id, desired, Some(progress_callback))
        .await;

    if !pb.is_finished() {
        pb.finish_and_clear();
    }

    let engine = result?;
    info!("Engine {} reached {}", engine_id, desired);
    Ok(engine)
}
