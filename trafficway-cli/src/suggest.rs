//! Suggest command implementation for the trafficway CLI.

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use trafficway_core::PlaceCandidate;
use trafficway_data::geocoding::{DEFAULT_GEOCODER_BASE_URL, HttpGeocoderConfig};

use crate::places::{candidates, one_shot_resolver};
use crate::providers::{HttpProviders, ProviderBuilder};
use crate::{ARG_GEOCODER_BASE_URL, ARG_QUERY, CliError, ENV_QUERY};

/// CLI arguments for the `suggest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "suggest",
    long_about = "Look up a partial place name and print the ranked \
                 candidates as JSON. Queries shorter than three characters \
                 return no candidates.",
    about = "Suggest places matching a partial name"
)]
#[ortho_config(prefix = "TRAFFICWAY")]
pub(crate) struct SuggestArgs {
    /// Partial place name.
    #[arg(value_name = "query")]
    #[serde(default)]
    pub(crate) query: Option<String>,
    /// Base URL for the geocoding service.
    #[arg(long = ARG_GEOCODER_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) geocoder_base_url: Option<String>,
}

impl SuggestArgs {
    pub(crate) fn into_config(self) -> Result<SuggestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SuggestConfig::try_from(merged)
    }
}

/// Resolved `suggest` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct SuggestConfig {
    pub(crate) query: String,
    pub(crate) geocoder: HttpGeocoderConfig,
}

impl TryFrom<SuggestArgs> for SuggestConfig {
    type Error = CliError;

    fn try_from(args: SuggestArgs) -> Result<Self, Self::Error> {
        let query = args.query.ok_or(CliError::MissingArgument {
            field: ARG_QUERY,
            env: ENV_QUERY,
        })?;
        let base_url = args
            .geocoder_base_url
            .unwrap_or_else(|| DEFAULT_GEOCODER_BASE_URL.to_owned());
        Ok(Self {
            query,
            geocoder: HttpGeocoderConfig::new(base_url),
        })
    }
}

pub(crate) async fn run_suggest(args: SuggestArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    let mut stdout = std::io::stdout().lock();
    run_suggest_with(&config, &HttpProviders, &mut stdout).await
}

pub(crate) async fn run_suggest_with<B: ProviderBuilder>(
    config: &SuggestConfig,
    builder: &B,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let resolver = one_shot_resolver(builder.geocoder(&config.geocoder)?);
    let found = candidates(&resolver, &config.query).await;
    write_candidates(writer, &found)
}

fn write_candidates(writer: &mut dyn Write, found: &[PlaceCandidate]) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(found).map_err(CliError::Serialise)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SuggestConfig, CliError> {
    let merged = SuggestArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SuggestConfig::try_from(merged)
}
