//! Command-line interface for the TrashMap collection-point engine.
#![forbid(unsafe_code)]

use std::io::{self, Write};

use clap::{Parser, Subcommand};

mod backend;
mod error;
mod materials;
mod search;
mod sync;

pub use error::CliError;

use materials::{MaterialsArgs, run_materials};
use search::{SearchArgs, run_search};
use sync::{NearbyArgs, SyncArgs, run_nearby, run_sync};

const ENV_PREFIX: &str = "TRASHMAP";

const CMD_SYNC: &str = "sync";
const CMD_SEARCH: &str = "search";
const CMD_MATERIALS: &str = "materials";
const CMD_NEARBY: &str = "nearby";

const ARG_BASE_URL: &str = "base-url";
const ARG_API_KEY: &str = "api-key";
const ARG_CACHE_DB: &str = "cache-db";
const ARG_TEXT: &str = "text";
const ARG_MATERIAL: &str = "material";
const ARG_LATITUDE: &str = "latitude";
const ARG_LONGITUDE: &str = "longitude";
const ARG_LIMIT: &str = "limit";

/// Environment variable that sets `field` for `command`.
pub(crate) fn env_var(command: &str, field: &str) -> String {
    format!("{ENV_PREFIX}_CMDS_{command}_{field}")
        .to_uppercase()
        .replace('-', "_")
}

/// Run the TrashMap CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    runtime.block_on(dispatch(cli.command, &mut handle))?;
    handle.flush().map_err(CliError::WriteOutput)
}

async fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Sync(args) => run_sync(args, writer).await,
        Command::Search(args) => run_search(args, writer).await,
        Command::Materials(args) => run_materials(args, writer).await,
        Command::Nearby(args) => run_nearby(args, writer).await,
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "trashmap",
    about = "Browse waste collection points from the terminal",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Refresh the collection points and print them.
    Sync(SyncArgs),
    /// Search points by name and accepted material.
    Search(SearchArgs),
    /// List the material catalogue.
    Materials(MaterialsArgs),
    /// Print the points nearest to a coordinate.
    Nearby(NearbyArgs),
}

#[cfg(test)]
mod tests;
