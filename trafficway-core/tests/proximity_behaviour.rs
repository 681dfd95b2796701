//! Behavioural tests for matching junctions to route geometry.

use std::cell::RefCell;
use std::collections::BTreeSet;

use chrono::Utc;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use trafficway_core::proximity::{METERS_PER_DEGREE, ProximityMatcher};
use trafficway_core::{CongestionLevel, GeoPoint, JunctionId, JunctionState};

const CENTRAL_LONDON: GeoPoint = GeoPoint {
    latitude: 51.500,
    longitude: -0.10,
};

/// World state for proximity scenarios.
#[derive(Debug, Default)]
struct ProximityWorld {
    route: RefCell<Vec<GeoPoint>>,
    junction: RefCell<Option<JunctionState>>,
    matched: RefCell<BTreeSet<JunctionId>>,
}

#[fixture]
fn world() -> ProximityWorld {
    ProximityWorld::default()
}

fn place_junction(world: &ProximityWorld, point: GeoPoint) {
    world.junction.replace(Some(JunctionState {
        id: 42,
        point,
        congestion_level: CongestionLevel::High,
        vehicle_count: 18,
        observed_at: Utc::now(),
    }));
}

#[given("a route from central London heading north east")]
fn given_route(world: &ProximityWorld) {
    world.route.replace(vec![
        CENTRAL_LONDON,
        GeoPoint {
            latitude: 51.505,
            longitude: -0.09,
        },
        GeoPoint {
            latitude: 51.510,
            longitude: -0.08,
        },
    ]);
}

#[given("an empty route")]
fn given_empty_route(world: &ProximityWorld) {
    world.route.replace(Vec::new());
}

#[given("a junction placed on the first route vertex")]
fn given_vertex_junction(world: &ProximityWorld) {
    let first = world.route.borrow().first().copied();
    place_junction(world, first.unwrap_or(CENTRAL_LONDON));
}

#[given("a junction placed on central London")]
fn given_central_junction(world: &ProximityWorld) {
    place_junction(world, CENTRAL_LONDON);
}

#[given("a junction placed 501 metres south of the route start")]
fn given_offset_junction(world: &ProximityWorld) {
    place_junction(
        world,
        GeoPoint {
            latitude: CENTRAL_LONDON.latitude - 501.0 / METERS_PER_DEGREE,
            longitude: CENTRAL_LONDON.longitude,
        },
    );
}

#[when("the junctions are matched against the route")]
fn when_matched(world: &ProximityWorld) {
    let route = world.route.borrow();
    let junction = world.junction.borrow();
    let matched = ProximityMatcher::default().matches(&route, junction.iter());
    world.matched.replace(matched);
}

#[then("the junction is on the route")]
fn then_on_route(world: &ProximityWorld) {
    assert!(world.matched.borrow().contains(&42));
}

#[then("the junction is not on the route")]
fn then_off_route(world: &ProximityWorld) {
    assert!(world.matched.borrow().is_empty());
}

#[scenario(path = "tests/features/proximity.feature", index = 0)]
fn vertex_junction_matches(world: ProximityWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/proximity.feature", index = 1)]
fn junction_beyond_threshold(world: ProximityWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/proximity.feature", index = 2)]
fn empty_route_matches_nothing(world: ProximityWorld) {
    let _ = world;
}
