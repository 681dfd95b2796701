//! Focused unit tests covering plan CLI configuration and execution.

use super::helpers::{
    DESTINATION_ARG, ORIGIN_ARG, Snapshot, StubProviders, congested_route_y, feed_line,
    parse_outcome, plan_config, plan_output,
};
use super::*;
use crate::plan::{PlanArgs, PlanConfig, config_from_layers_for_test, load_snapshot};
use crate::providers::{HttpProviders, ProviderBuilder};
use camino::Utf8PathBuf;
use chrono::{Duration as ChronoDuration, Utc};
use rstest::rstest;
use tempfile::TempDir;
use trafficway_core::congestion::{DEFAULT_VALIDITY_WINDOW, SharedCongestionCache};
use trafficway_core::{CongestionLevel, ControllerState, RoutingError};
use trafficway_data::routing::HttpRoutingProviderConfig;
use trafficway_data::routing::test_support::StubRoutingProvider;
use trafficway_planner::PlannerError;
use trafficway_planner::test_support::london::{DESTINATION, NORTHERN_JUNCTION, ORIGIN};

#[rstest]
#[case(None, Some("51.51,-0.08"), ARG_ORIGIN, ENV_ORIGIN)]
#[case(Some("51.5,-0.1"), None, ARG_DESTINATION, ENV_DESTINATION)]
fn converting_without_required_fields_errors(
    #[case] origin: Option<&str>,
    #[case] destination: Option<&str>,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = PlanArgs {
        origin: origin.map(str::to_owned),
        destination: destination.map(str::to_owned),
        ..PlanArgs::default()
    };
    let err = PlanConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn plan_config_defaults_service_urls() {
    let config = plan_config(ORIGIN_ARG, DESTINATION_ARG);

    assert_eq!(config.routing.base_url, "http://localhost:5000");
    assert_eq!(config.routing.api_key, None);
    assert_eq!(
        config.geocoder.base_url,
        "https://nominatim.openstreetmap.org"
    );
    assert!(config.congestion_snapshot.is_none());
    assert!(!config.follow);
}

#[rstest]
fn routing_api_key_reaches_the_provider_config() {
    let args = PlanArgs {
        origin: Some(ORIGIN_ARG.to_owned()),
        destination: Some(DESTINATION_ARG.to_owned()),
        routing_api_key: Some("secret".to_owned()),
        ..PlanArgs::default()
    };

    let config = PlanConfig::try_from(args).expect("config should build");

    assert_eq!(config.routing.api_key.as_deref(), Some("secret"));
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "origin": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "origin": "from-file",
            "destination": "from-file",
            "osrm_base_url": "http://from-file:5000",
        }),
        None,
    );
    composer.push_environment(json!({
        "origin": "from-env",
        "destination": "from-env",
    }));
    composer.push_cli(json!({ "destination": "from-cli" }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.origin, "from-env");
    assert_eq!(config.destination, "from-cli");
    assert_eq!(config.routing.base_url, "http://from-file:5000");
}

#[rstest]
fn validate_sources_accepts_a_missing_snapshot_flag() {
    let config = plan_config(ORIGIN_ARG, DESTINATION_ARG);
    config.validate_sources().expect("nothing to validate");
}

#[rstest]
fn validate_sources_reports_missing_snapshot() {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    let config = PlanConfig {
        congestion_snapshot: Some(root.join("absent.jsonl")),
        ..plan_config(ORIGIN_ARG, DESTINATION_ARG)
    };

    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_CONGESTION_SNAPSHOT),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_directories() {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    let config = PlanConfig {
        congestion_snapshot: Some(root),
        ..plan_config(ORIGIN_ARG, DESTINATION_ARG)
    };

    let err = config
        .validate_sources()
        .expect_err("expected directory rejection");
    match err {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_CONGESTION_SNAPSHOT),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn load_snapshot_ignores_replayed_observations() {
    let cache = SharedCongestionCache::init(DEFAULT_VALIDITY_WINDOW);
    let earlier = (Utc::now() - ChronoDuration::minutes(1)).to_rfc3339();
    let replayed = format!(
        r#"{{"junction_id": 1, "latitude": 51.51, "longitude": -0.1, "vehicle_count": 2, "observed_at": "{earlier}"}}"#
    );
    let snapshot = Snapshot::with_lines(&[congested_route_y(), replayed]);

    let stored = load_snapshot(&cache, snapshot.path()).expect("snapshot loads");

    assert_eq!(stored, 1);
    assert_eq!(
        cache.levels(Utc::now()).get(&1),
        Some(&CongestionLevel::High)
    );
}

#[rstest]
fn load_snapshot_reports_corrupt_lines() {
    let cache = SharedCongestionCache::init(DEFAULT_VALIDITY_WINDOW);
    let snapshot = Snapshot::with_lines(&[congested_route_y(), "not json".to_owned()]);

    let err = load_snapshot(&cache, snapshot.path()).expect_err("corrupt snapshot");

    match err {
        CliError::LoadSnapshot { path, .. } => assert_eq!(&path, snapshot.path()),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn http_providers_report_build_failures() {
    let err = HttpProviders
        .routing(&HttpRoutingProviderConfig::new("not a url"))
        .expect_err("invalid base URL");

    match err {
        CliError::BuildProvider {
            provider, base_url, ..
        } => {
            assert_eq!(provider, "routing");
            assert_eq!(base_url, "not a url");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn planning_between_coordinates_recommends_the_fastest_route() {
    let config = plan_config(ORIGIN_ARG, DESTINATION_ARG);

    let output = plan_output(&config, &StubProviders::london(), b"")
        .await
        .expect("plan succeeds");

    let outcome = parse_outcome(&output);
    assert_eq!(outcome.state, ControllerState::Settled);
    assert_eq!(outcome.routes.len(), 2);
    assert_eq!(outcome.recommended_route_id, Some(2));
}

#[rstest]
#[tokio::test]
async fn snapshot_congestion_steers_the_recommendation() {
    let snapshot = Snapshot::with_lines(&[congested_route_y()]);
    let config = PlanConfig {
        congestion_snapshot: Some(snapshot.path().clone()),
        ..plan_config(ORIGIN_ARG, DESTINATION_ARG)
    };

    let output = plan_output(&config, &StubProviders::london(), b"")
        .await
        .expect("plan succeeds");

    let outcome = parse_outcome(&output);
    assert_eq!(outcome.recommended_route_id, Some(1));
    let congested = outcome
        .routes
        .iter()
        .find(|route| route.id == 2)
        .expect("route Y present");
    assert_eq!(congested.congestion_count, 1);
}

#[rstest]
#[tokio::test]
async fn place_names_are_resolved_with_the_geocoder() {
    let config = plan_config("waterloo station", "moorgate");
    let providers = StubProviders::with_routing(StubRoutingProvider::straight_line());

    let output = plan_output(&config, &providers, b"")
        .await
        .expect("plan succeeds");

    let outcome = parse_outcome(&output);
    let route = outcome.recommended().expect("one route recommended");
    assert_eq!(route.polyline, vec![ORIGIN, DESTINATION]);
}

#[rstest]
#[tokio::test]
async fn unknown_places_are_reported() {
    let config = plan_config("atlantis", DESTINATION_ARG);

    let err = plan_output(&config, &StubProviders::london(), b"")
        .await
        .expect_err("unknown origin");

    match err {
        CliError::UnknownPlace { field, query } => {
            assert_eq!(field, ARG_ORIGIN);
            assert_eq!(query, "atlantis");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn out_of_range_coordinates_are_explained() {
    let config = plan_config("95.0,-0.1", DESTINATION_ARG);

    let output = plan_output(&config, &StubProviders::london(), b"")
        .await
        .expect("invalid input is not fatal");

    let outcome = parse_outcome(&output);
    assert_eq!(outcome.state, ControllerState::Idle);
    assert!(outcome.routes.is_empty());
    assert!(
        outcome
            .rationale
            .starts_with("The origin is not a valid location"),
        "{}",
        outcome.rationale
    );
}

#[rstest]
#[tokio::test]
async fn missing_credentials_stop_the_command() {
    let config = plan_config(ORIGIN_ARG, DESTINATION_ARG);
    let providers = StubProviders::failing_routing(RoutingError::MissingCredentials {
        provider: "osrm".to_owned(),
    });

    let err = plan_output(&config, &providers, b"")
        .await
        .expect_err("misconfiguration is fatal");

    match err {
        CliError::Planner(PlannerError::Configuration { source }) => {
            assert!(source.is_configuration_error());
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn transient_failures_are_reported_in_the_outcome() {
    let config = plan_config(ORIGIN_ARG, DESTINATION_ARG);
    let providers = StubProviders::failing_routing(RoutingError::NoRoute);

    let output = plan_output(&config, &providers, b"")
        .await
        .expect("transient failures are not fatal");

    let outcome = parse_outcome(&output);
    assert!(outcome.routes.is_empty());
    assert_eq!(outcome.recommended_route_id, None);
    assert!(!outcome.rationale.is_empty());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn follow_prints_each_change_until_stdin_closes() {
    let config = PlanConfig {
        follow: true,
        ..plan_config(ORIGIN_ARG, DESTINATION_ARG)
    };
    let input = format!(
        "{}\nnot an event\n{}\n",
        congested_route_y(),
        feed_line(2, NORTHERN_JUNCTION, CongestionLevel::Medium)
    );

    let output = plan_output(&config, &StubProviders::london(), input.as_bytes())
        .await
        .expect("follow succeeds");

    let outcomes: Vec<_> = output.lines().map(parse_outcome).collect();
    let first = outcomes.first().expect("initial outcome printed");
    let last = outcomes.last().expect("final outcome printed");
    assert!(outcomes.len() >= 2, "expected a replan, got {output}");
    assert_eq!(first.recommended_route_id, Some(2));
    assert_eq!(last.state, ControllerState::Settled);
    assert_eq!(last.recommended_route_id, Some(1));
}
