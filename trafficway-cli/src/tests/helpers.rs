//! Test doubles and fixtures shared by the CLI tests.

use super::*;
use crate::plan::{PlanArgs, PlanConfig, run_plan_with};
use crate::providers::ProviderBuilder;
use camino::Utf8PathBuf;
use chrono::Utc;
use std::fs;
use tempfile::TempDir;
use trafficway_core::{CongestionLevel, GeoPoint, GeocodedPlace, PlanOutcome, RoutingError};
use trafficway_data::geocoding::HttpGeocoderConfig;
use trafficway_data::geocoding::test_support::StubGeocoder;
use trafficway_data::routing::HttpRoutingProviderConfig;
use trafficway_data::routing::test_support::StubRoutingProvider;
use trafficway_planner::test_support::london::{
    DESTINATION, NORTHERN_JUNCTION, ORIGIN, route_x, route_y,
};

pub(super) const ORIGIN_ARG: &str = "51.5,-0.1";
pub(super) const DESTINATION_ARG: &str = "51.51,-0.08";

/// Hands out clones of in-process providers.
pub(super) struct StubProviders {
    routing: StubRoutingProvider,
    geocoder: StubGeocoder,
}

impl StubProviders {
    /// Routes X (600 s) and Y (500 s) with a two-place gazetteer.
    pub(super) fn london() -> Self {
        Self::with_routing(StubRoutingProvider::with_routes(vec![route_x(), route_y()]))
    }

    pub(super) fn with_routing(routing: StubRoutingProvider) -> Self {
        Self {
            routing,
            geocoder: gazetteer(),
        }
    }

    pub(super) fn with_geocoder(geocoder: StubGeocoder) -> Self {
        Self {
            routing: StubRoutingProvider::straight_line(),
            geocoder,
        }
    }

    pub(super) fn failing_routing(error: RoutingError) -> Self {
        Self::with_routing(StubRoutingProvider::with_error(error))
    }
}

impl ProviderBuilder for StubProviders {
    type Routing = StubRoutingProvider;
    type Geocoding = StubGeocoder;

    fn routing(&self, _config: &HttpRoutingProviderConfig) -> Result<Self::Routing, CliError> {
        Ok(self.routing.clone())
    }

    fn geocoder(&self, _config: &HttpGeocoderConfig) -> Result<Self::Geocoding, CliError> {
        Ok(self.geocoder.clone())
    }
}

pub(super) fn place(display_name: &str, point: GeoPoint) -> GeocodedPlace {
    GeocodedPlace {
        point,
        display_name: display_name.to_owned(),
    }
}

pub(super) fn gazetteer() -> StubGeocoder {
    StubGeocoder::with_places(vec![
        place("Waterloo Station, London", ORIGIN),
        place("Waterloo Bridge, London", NORTHERN_JUNCTION),
        place("Moorgate, London", DESTINATION),
    ])
}

pub(super) fn plan_config(origin: &str, destination: &str) -> PlanConfig {
    PlanConfig::try_from(PlanArgs {
        origin: Some(origin.to_owned()),
        destination: Some(destination.to_owned()),
        ..PlanArgs::default()
    })
    .expect("both endpoints supplied")
}

/// One feed line observed now.
pub(super) fn feed_line(junction: u64, point: GeoPoint, level: CongestionLevel) -> String {
    format!(
        r#"{{"junction_id": {junction}, "latitude": {}, "longitude": {}, "congestion_level": "{level}", "vehicle_count": 10, "observed_at": "{}"}}"#,
        point.latitude,
        point.longitude,
        Utc::now().to_rfc3339()
    )
}

/// A high-congestion observation on route Y.
pub(super) fn congested_route_y() -> String {
    feed_line(1, NORTHERN_JUNCTION, CongestionLevel::High)
}

/// A snapshot file in its own temporary directory.
pub(super) struct Snapshot {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl Snapshot {
    pub(super) fn with_lines(lines: &[String]) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        let path = root.join("congestion.jsonl");
        fs::write(&path, lines.join("\n")).expect("write snapshot");
        Self { _dir: dir, path }
    }

    pub(super) fn path(&self) -> &Utf8PathBuf {
        &self.path
    }
}

/// Run the plan command and return what it printed.
pub(super) async fn plan_output(
    config: &PlanConfig,
    providers: &StubProviders,
    input: &[u8],
) -> Result<String, CliError> {
    let mut out = Vec::new();
    run_plan_with(config, providers, input, &mut out).await?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}

pub(super) fn parse_outcome(json: &str) -> PlanOutcome {
    serde_json::from_str(json).expect("plan outcome JSON")
}
