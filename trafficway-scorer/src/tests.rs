//! Unit coverage for route ranking.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use rstest::rstest;
use trafficway_core::{
    CongestionLevel, GeoPoint, JunctionId, JunctionState, ProviderRoute, RouteCandidate, RouteId,
    number_routes,
};

use crate::{Rationale, RouteScorer, rank};

const ORIGIN: GeoPoint = GeoPoint {
    latitude: 51.500,
    longitude: -0.10,
};
const DESTINATION: GeoPoint = GeoPoint {
    latitude: 51.510,
    longitude: -0.08,
};

fn route(
    id: RouteId,
    duration_seconds: f64,
    junctions: impl IntoIterator<Item = JunctionId>,
) -> RouteCandidate {
    RouteCandidate::from_provider(
        id,
        ProviderRoute {
            polyline: vec![ORIGIN, DESTINATION],
            distance_meters: 2_000.0,
            duration_seconds,
        },
    )
    .with_matched_junctions(junctions.into_iter().collect())
}

fn levels() -> BTreeMap<JunctionId, CongestionLevel> {
    BTreeMap::from([
        (1, CongestionLevel::High),
        (2, CongestionLevel::High),
        (3, CongestionLevel::Medium),
        (4, CongestionLevel::Low),
    ])
}

fn recommended_flags(routes: &[RouteCandidate]) -> Vec<RouteId> {
    routes
        .iter()
        .filter(|candidate| candidate.is_recommended)
        .map(|candidate| candidate.id)
        .collect()
}

#[rstest]
fn clear_route_beats_faster_congested_route() {
    let ranking = rank(vec![route(1, 600.0, []), route(2, 500.0, [1])], &levels());
    assert_eq!(ranking.order, vec![1, 2]);
    assert_eq!(recommended_flags(&ranking.routes), vec![1]);
    assert_eq!(
        ranking.rationale,
        Rationale::Clear {
            route_id: 1,
            minutes: 10,
            avoided: 1,
        }
    );
}

#[rstest]
fn only_high_junctions_count() {
    let ranking = rank(vec![route(1, 600.0, [3, 4]), route(2, 500.0, [1])], &levels());
    let counts: Vec<usize> = ranking.routes.iter().map(|r| r.congestion_count).collect();
    assert_eq!(counts, vec![0, 1]);
    assert_eq!(ranking.recommended_id(), Some(1));
}

#[rstest]
fn duration_breaks_equal_congestion() {
    let ranking = rank(
        vec![route(1, 700.0, [1]), route(2, 650.0, [2]), route(3, 900.0, [])],
        &levels(),
    );
    assert_eq!(ranking.order, vec![3, 2, 1]);
}

#[rstest]
fn provider_order_breaks_full_ties() {
    let ranking = rank(
        vec![route(1, 600.0, [1]), route(2, 600.0, [2]), route(3, 600.0, [])],
        &levels(),
    );
    assert_eq!(ranking.order, vec![3, 1, 2]);
}

#[rstest]
fn least_congested_route_is_recommended_when_all_are_congested() {
    let ranking = rank(vec![route(1, 400.0, [1, 2]), route(2, 800.0, [2])], &levels());
    assert_eq!(recommended_flags(&ranking.routes), vec![2]);
    assert_eq!(
        ranking.rationale,
        Rationale::Congested {
            route_id: 2,
            high_count: 1,
            route_count: 2,
        }
    );
    let text = ranking.rationale.to_string();
    assert!(text.contains("1 heavily congested junction"), "{text}");
}

#[rstest]
fn single_route_is_recommended() {
    let ranking = rank(vec![route(1, 400.0, [1, 2])], &levels());
    assert_eq!(ranking.recommended_id(), Some(1));
    assert!(
        ranking
            .rationale
            .to_string()
            .contains("only option and passes 2 heavily congested junctions")
    );
}

#[rstest]
fn empty_input_has_no_recommendation() {
    let ranking = rank(Vec::new(), &levels());
    assert!(ranking.routes.is_empty());
    assert_eq!(ranking.recommended(), None);
    assert_eq!(ranking.rationale, Rationale::NoRoutes);
}

#[rstest]
fn unknown_junctions_are_not_counted() {
    let ranking = rank(vec![route(1, 400.0, [99])], &BTreeMap::new());
    assert!(ranking.routes.iter().all(|r| r.congestion_count == 0));
}

#[rstest]
fn scorer_matches_fresh_junctions_before_ranking() {
    let observed_at = DateTime::<Utc>::UNIX_EPOCH;
    let junctions = BTreeMap::from([(
        5,
        JunctionState {
            id: 5,
            point: DESTINATION,
            congestion_level: CongestionLevel::High,
            vehicle_count: 30,
            observed_at,
        },
    )]);
    let detour = RouteCandidate::from_provider(
        2,
        ProviderRoute {
            polyline: vec![
                ORIGIN,
                GeoPoint {
                    latitude: 51.48,
                    longitude: -0.05,
                },
            ],
            distance_meters: 4_000.0,
            duration_seconds: 900.0,
        },
    );
    let ranking = RouteScorer::default().score(vec![route(1, 500.0, []), detour], &junctions);

    let matched: Vec<&BTreeSet<JunctionId>> = ranking
        .routes
        .iter()
        .map(|candidate| &candidate.matched_junctions)
        .collect();
    assert_eq!(matched, vec![&BTreeSet::from([5]), &BTreeSet::new()]);
    assert_eq!(ranking.recommended_id(), Some(2));
}

fn arbitrary_routes() -> impl Strategy<Value = Vec<RouteCandidate>> {
    prop::collection::vec(
        (0u32..3_600, prop::collection::btree_set(0u64..8, 0..4)),
        1..5,
    )
    .prop_map(|specs| {
        let provider: Vec<ProviderRoute> = specs
            .iter()
            .map(|(seconds, _)| ProviderRoute {
                polyline: vec![ORIGIN, DESTINATION],
                distance_meters: 1_000.0,
                duration_seconds: f64::from(*seconds),
            })
            .collect();
        number_routes(provider)
            .into_iter()
            .zip(specs)
            .map(|(candidate, (_, junctions))| candidate.with_matched_junctions(junctions))
            .collect()
    })
}

fn arbitrary_levels() -> impl Strategy<Value = BTreeMap<JunctionId, CongestionLevel>> {
    prop::collection::btree_map(
        0u64..8,
        prop_oneof![
            Just(CongestionLevel::Low),
            Just(CongestionLevel::Medium),
            Just(CongestionLevel::High),
        ],
        0..8,
    )
}

proptest! {
    #[test]
    fn ranking_is_deterministic(routes in arbitrary_routes(), levels in arbitrary_levels()) {
        let first = rank(routes.clone(), &levels);
        let second = rank(routes, &levels);
        prop_assert_eq!(&first, &second);
    }

    #[test]
    fn exactly_one_route_is_recommended(routes in arbitrary_routes(), levels in arbitrary_levels()) {
        let ranking = rank(routes, &levels);
        prop_assert_eq!(recommended_flags(&ranking.routes).len(), 1);
        let best = ranking.recommended().map(|r| r.congestion_count);
        let fewest = ranking.routes.iter().map(|r| r.congestion_count).min();
        prop_assert_eq!(best, fewest);
    }
}
