//! Plan command implementation for the trafficway CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::{debug, info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::{mpsc, watch};
use trafficway_core::congestion::{SharedCongestionCache, Upsert};
use trafficway_core::{GeoPoint, PlanOutcome, RoutingProvider};
use trafficway_data::feed::{PumpSummary, pump_events, read_events};
use trafficway_data::geocoding::{DEFAULT_GEOCODER_BASE_URL, HttpGeocoderConfig};
use trafficway_data::routing::{DEFAULT_ROUTING_BASE_URL, HttpRoutingProviderConfig};
use trafficway_planner::{PlannerCommand, PlannerConfig, PlannerLoop, RoutePlanningController};

use crate::places::{one_shot_resolver, resolve_endpoint};
use crate::providers::{HttpProviders, ProviderBuilder};
use crate::{
    ARG_CONGESTION_SNAPSHOT, ARG_DESTINATION, ARG_GEOCODER_BASE_URL, ARG_ORIGIN,
    ARG_OSRM_BASE_URL, ARG_ROUTING_API_KEY, CliError, ENV_DESTINATION, ENV_ORIGIN,
};

/// Feed events buffered between stdin and the planner loop.
const FEED_BUFFER: usize = 64;

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser)]
#[command(
    long_about = "Plan a route between two places and print the ranked \
                 routes with a recommendation as JSON. Places are either \
                 `lat,lon` pairs or names looked up with the geocoder. With \
                 --follow, congestion events are read from stdin as JSON \
                 lines and every change to the plan is printed on its own \
                 line until stdin closes.",
    about = "Plan a congestion-aware route"
)]
pub(crate) struct PlanCommand {
    #[command(flatten)]
    pub(crate) settings: PlanArgs,
    /// Keep re-planning from congestion events read on stdin.
    #[arg(long)]
    pub(crate) follow: bool,
}

impl PlanCommand {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self
            .settings
            .load_and_merge()
            .map_err(CliError::Configuration)?;
        Ok(PlanConfig {
            follow: self.follow,
            ..PlanConfig::try_from(merged)?
        })
    }
}

/// Layered settings for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "plan")]
#[ortho_config(prefix = "TRAFFICWAY")]
pub(crate) struct PlanArgs {
    /// Route start as `lat,lon` or a place name.
    #[arg(long = ARG_ORIGIN, value_name = "place")]
    #[serde(default)]
    pub(crate) origin: Option<String>,
    /// Route end as `lat,lon` or a place name.
    #[arg(long = ARG_DESTINATION, value_name = "place")]
    #[serde(default)]
    pub(crate) destination: Option<String>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Base URL for the geocoding service.
    #[arg(long = ARG_GEOCODER_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) geocoder_base_url: Option<String>,
    /// API key appended to routing requests.
    #[arg(long = ARG_ROUTING_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) routing_api_key: Option<String>,
    /// JSON-lines file of junction observations loaded before planning.
    #[arg(long = ARG_CONGESTION_SNAPSHOT, value_name = "path")]
    #[serde(default)]
    pub(crate) congestion_snapshot: Option<Utf8PathBuf>,
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct PlanConfig {
    pub(crate) origin: String,
    pub(crate) destination: String,
    pub(crate) routing: HttpRoutingProviderConfig,
    pub(crate) geocoder: HttpGeocoderConfig,
    pub(crate) congestion_snapshot: Option<Utf8PathBuf>,
    pub(crate) follow: bool,
    pub(crate) planner: PlannerConfig,
}

impl PlanConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        let Some(path) = &self.congestion_snapshot else {
            return Ok(());
        };
        match trafficway_fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field: ARG_CONGESTION_SNAPSHOT,
                path: path.clone(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field: ARG_CONGESTION_SNAPSHOT,
                    path: path.clone(),
                })
            }
            Err(source) => Err(CliError::OpenSource {
                field: ARG_CONGESTION_SNAPSHOT,
                path: path.clone(),
                source,
            }),
        }
    }
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let origin = args.origin.ok_or(CliError::MissingArgument {
            field: ARG_ORIGIN,
            env: ENV_ORIGIN,
        })?;
        let destination = args.destination.ok_or(CliError::MissingArgument {
            field: ARG_DESTINATION,
            env: ENV_DESTINATION,
        })?;

        let osrm_base_url = args
            .osrm_base_url
            .unwrap_or_else(|| DEFAULT_ROUTING_BASE_URL.to_owned());
        let routing = match args.routing_api_key {
            Some(key) => HttpRoutingProviderConfig::new(osrm_base_url).with_api_key(key),
            None => HttpRoutingProviderConfig::new(osrm_base_url),
        };
        let geocoder_base_url = args
            .geocoder_base_url
            .unwrap_or_else(|| DEFAULT_GEOCODER_BASE_URL.to_owned());

        Ok(Self {
            origin,
            destination,
            routing,
            geocoder: HttpGeocoderConfig::new(geocoder_base_url),
            congestion_snapshot: args.congestion_snapshot,
            follow: false,
            planner: PlannerConfig::default(),
        })
    }
}

pub(crate) async fn run_plan(command: PlanCommand) -> Result<(), CliError> {
    let config = command.into_config()?;
    config.validate_sources()?;
    let input = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout().lock();
    run_plan_with(&config, &HttpProviders, input, &mut stdout).await
}

/// Plan once, then keep following `input` when the config asks for it.
pub(crate) async fn run_plan_with<B, R>(
    config: &PlanConfig,
    builder: &B,
    input: R,
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    B: ProviderBuilder,
    R: AsyncBufRead + Unpin,
{
    let resolver = one_shot_resolver(builder.geocoder(&config.geocoder)?);
    let origin = resolve_endpoint(&resolver, ARG_ORIGIN, &config.origin).await?;
    let destination = resolve_endpoint(&resolver, ARG_DESTINATION, &config.destination).await?;

    let cache = SharedCongestionCache::init(config.planner.validity_window);
    let endpoints = (origin, destination);
    let result = plan_with_cache(config, builder, &cache, endpoints, input, writer).await;
    cache.teardown();
    result
}

async fn plan_with_cache<B, R>(
    config: &PlanConfig,
    builder: &B,
    cache: &SharedCongestionCache,
    (origin, destination): (GeoPoint, GeoPoint),
    input: R,
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    B: ProviderBuilder,
    R: AsyncBufRead + Unpin,
{
    if let Some(path) = &config.congestion_snapshot {
        load_snapshot(cache, path)?;
    }
    let provider = builder.routing(&config.routing)?;
    let mut controller =
        RoutePlanningController::with_config(provider, cache.clone(), config.planner);
    if let Some(request) = controller.select_endpoints(Some(origin), Some(destination)) {
        let applied = controller.plan(request).await?;
        debug!("initial plan {applied:?}");
    }

    if config.follow {
        write_outcome(writer, controller.outcome(), Layout::Line)?;
        follow(controller, input, writer).await
    } else {
        write_outcome(writer, controller.outcome(), Layout::Pretty)
    }
}

/// Load a snapshot into `cache`, returning the number of stored events.
pub(crate) fn load_snapshot(
    cache: &SharedCongestionCache,
    path: &Utf8Path,
) -> Result<usize, CliError> {
    let reader = trafficway_fs::open_buffered(path).map_err(|source| CliError::OpenSource {
        field: ARG_CONGESTION_SNAPSHOT,
        path: path.to_path_buf(),
        source,
    })?;
    let events = read_events(reader).map_err(|source| CliError::LoadSnapshot {
        path: path.to_path_buf(),
        source,
    })?;
    let total = events.len();
    let mut stored = 0_usize;
    for state in events {
        if cache.upsert(state) != Upsert::Outdated {
            stored += 1;
        }
    }
    info!("loaded {stored} of {total} junction observations from {path}");
    Ok(stored)
}

/// Feed `input` into a planner loop and print every outcome change.
///
/// End of input closes both the feed and the command channel, so the loop
/// finishes outstanding replans before it stops.
async fn follow<P, R>(
    controller: RoutePlanningController<P>,
    input: R,
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    P: RoutingProvider + 'static,
    R: AsyncBufRead + Unpin,
{
    let (command_tx, command_rx) = mpsc::channel::<PlannerCommand>(1);
    let (feed_tx, feed_rx) = mpsc::channel(FEED_BUFFER);
    let (outcome_tx, mut outcome_rx) = watch::channel(controller.outcome().clone());
    let mut planner = PlannerLoop::new(controller);

    let planning = async move {
        let result = planner.run(command_rx, feed_rx, &outcome_tx).await;
        // Closing the channel ends the printer.
        drop(outcome_tx);
        result
    };

    let feeding = async move {
        tokio::select! {
            pumped = pump_events(input, feed_tx) => pumped.map(Some),
            () = command_tx.closed() => Ok(None),
        }
    };

    let printing = async {
        while outcome_rx.changed().await.is_ok() {
            let outcome = outcome_rx.borrow_and_update().clone();
            write_outcome(&mut *writer, &outcome, Layout::Line)?;
        }
        Ok::<(), CliError>(())
    };

    let (planned, fed, printed) = tokio::join!(planning, feeding, printing);
    let stats = planned?;
    info!("stopped following: {stats:?}");
    match fed.map_err(CliError::Feed)? {
        Some(PumpSummary { delivered, skipped }) => {
            info!("stdin closed after {delivered} events");
            if skipped > 0 {
                warn!("{skipped} malformed feed lines were skipped");
            }
        }
        None => debug!("planner stopped before stdin closed"),
    }
    printed
}

#[derive(Debug, Clone, Copy)]
enum Layout {
    Pretty,
    Line,
}

fn write_outcome(
    writer: &mut dyn Write,
    outcome: &PlanOutcome,
    layout: Layout,
) -> Result<(), CliError> {
    let payload = match layout {
        Layout::Pretty => serde_json::to_string_pretty(outcome),
        Layout::Line => serde_json::to_string(outcome),
    }
    .map_err(CliError::Serialise)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    writer.flush().map_err(CliError::WriteOutput)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
