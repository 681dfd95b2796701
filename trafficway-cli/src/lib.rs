//! Command-line interface for trafficway's route planner.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod places;
mod plan;
mod providers;
mod suggest;

pub use error::CliError;

use plan::PlanCommand;
use suggest::SuggestArgs;

pub(crate) const ARG_ORIGIN: &str = "origin";
pub(crate) const ARG_DESTINATION: &str = "destination";
pub(crate) const ARG_QUERY: &str = "query";
pub(crate) const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
pub(crate) const ARG_GEOCODER_BASE_URL: &str = "geocoder-base-url";
pub(crate) const ARG_ROUTING_API_KEY: &str = "routing-api-key";
pub(crate) const ARG_CONGESTION_SNAPSHOT: &str = "congestion-snapshot";
pub(crate) const ENV_ORIGIN: &str = "TRAFFICWAY_CMDS_PLAN_ORIGIN";
pub(crate) const ENV_DESTINATION: &str = "TRAFFICWAY_CMDS_PLAN_DESTINATION";
pub(crate) const ENV_QUERY: &str = "TRAFFICWAY_CMDS_SUGGEST_QUERY";

/// Run the trafficway CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, a
/// provider cannot be built, or planning fails on a configuration error.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    // Providers and the congestion cache are single-threaded.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    match cli.command {
        Command::Plan(args) => runtime.block_on(plan::run_plan(args)),
        Command::Suggest(args) => runtime.block_on(suggest::run_suggest(args)),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "trafficway",
    about = "Congestion-aware route planning from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a route, optionally following a live congestion feed on stdin.
    Plan(PlanCommand),
    /// Suggest places matching a partial name.
    Suggest(SuggestArgs),
}

#[cfg(test)]
mod tests;
