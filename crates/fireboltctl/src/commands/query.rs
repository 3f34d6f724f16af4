//! `execute` and `store`: run one query against a named engine

use fireboltctl_core::FireboltError;
use tracing::info;

use crate::cli::{Cli, QueryArgs, StoreArgs};
use crate::commands::engine::prepare_engine;
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::{combine_folder_and_file_name, ensure_folder, write_csv_file};

/// Run the query and print the response body exactly as received
pub async fn handle_execute(
    args: &QueryArgs,
    conn_mgr: &ConnectionManager,
    cli: &Cli,
) -> CliResult<()> {
    let target = conn_mgr.query_target(cli, args)?;
    let client = conn_mgr.create_client(cli).await?;

    let endpoint = prepare_engine(&client, &target.engine_name, args.start_wait_engine).await?;
    let response = client
        .execute(&endpoint, &target.database, &args.query)
        .await?;
    let text = response.text().await.map_err(FireboltError::from)?;

    println!("{}", text);
    Ok(())
}

/// Run the query and write its result set as CSV
pub async fn handle_store(
    args: &StoreArgs,
    conn_mgr: &ConnectionManager,
    cli: &Cli,
) -> CliResult<()> {
    let destination = combine_folder_and_file_name(
        &args.destination_folder_name,
        &args.destination_file_name,
    );
    ensure_folder(&args.destination_folder_name)?;

    let target = conn_mgr.query_target(cli, &args.query)?;
    let client = conn_mgr.create_client(cli).await?;

    let endpoint =
        prepare_engine(&client, &target.engine_name, args.query.start_wait_engine).await?;
    let result = client
        .query(&endpoint, &target.database, &args.query.query)
        .await?;

    write_csv_file(&result, &destination, args.file_header)?;
    info!(
        "Wrote {} row(s) to {}",
        result.data.len(),
        destination.display()
    );
    Ok(())
}
