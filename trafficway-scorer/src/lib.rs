//! Congestion-aware ranking of candidate routes.
//!
//! Routes are ordered by the number of fresh high-congestion junctions they
//! pass, then by estimated duration. Remaining ties keep provider order, so
//! the ranking is a pure function of its inputs. The first route in that
//! order is always recommended, even when every route is congested; the
//! accompanying [`Rationale`] then reports the actual count.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use std::collections::BTreeSet;
//! use trafficway_core::{CongestionLevel, GeoPoint, ProviderRoute, number_routes};
//! use trafficway_scorer::rank;
//!
//! let leg = |duration_seconds| ProviderRoute {
//!     polyline: vec![GeoPoint { latitude: 51.5, longitude: -0.1 }],
//!     distance_meters: 2_000.0,
//!     duration_seconds,
//! };
//! let mut routes = number_routes(vec![leg(600.0), leg(500.0)]);
//! if let Some(fast) = routes.last_mut() {
//!     fast.matched_junctions = BTreeSet::from([7]);
//! }
//! let levels = BTreeMap::from([(7, CongestionLevel::High)]);
//!
//! let ranking = rank(routes, &levels);
//! assert_eq!(ranking.recommended_id(), Some(1));
//! ```

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use log::debug;
use trafficway_core::proximity::ProximityMatcher;
use trafficway_core::{CongestionLevel, JunctionId, JunctionState, RouteCandidate, RouteId};

mod rationale;

pub use rationale::Rationale;

/// Ranked routes with the recommendation and its explanation.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// Routes in provider order with scoring fields populated.
    pub routes: Vec<RouteCandidate>,
    /// Route identifiers from most to least preferred.
    pub order: Vec<RouteId>,
    /// Explanation of the recommendation.
    pub rationale: Rationale,
}

impl Ranking {
    /// Identifier of the recommended route.
    #[must_use]
    pub fn recommended_id(&self) -> Option<RouteId> {
        self.order.first().copied()
    }

    /// The recommended route.
    #[must_use]
    pub fn recommended(&self) -> Option<&RouteCandidate> {
        self.routes.iter().find(|route| route.is_recommended)
    }
}

/// Rank proximity-matched routes against a congestion level snapshot.
///
/// `routes` must be in provider order; ties on both keys keep that order.
/// Exactly one route is flagged as recommended whenever `routes` is not
/// empty.
#[must_use]
pub fn rank(
    routes: Vec<RouteCandidate>,
    levels: &BTreeMap<JunctionId, CongestionLevel>,
) -> Ranking {
    let counted: Vec<RouteCandidate> = routes
        .into_iter()
        .map(|route| {
            let high = high_congestion_count(&route, levels);
            route.with_score(high, false)
        })
        .collect();

    let mut preferred: Vec<&RouteCandidate> = counted.iter().collect();
    preferred.sort_by(|a, b| {
        a.congestion_count
            .cmp(&b.congestion_count)
            .then_with(|| a.duration_seconds.total_cmp(&b.duration_seconds))
    });
    let order: Vec<RouteId> = preferred.iter().map(|route| route.id).collect();
    let recommended = order.first().copied();

    let ranked: Vec<RouteCandidate> = counted
        .into_iter()
        .map(|route| {
            let count = route.congestion_count;
            let is_recommended = Some(route.id) == recommended;
            route.with_score(count, is_recommended)
        })
        .collect();
    let rationale = Rationale::describe(&ranked, recommended);
    debug!("ranked routes {order:?}: {rationale}");
    Ranking {
        routes: ranked,
        order,
        rationale,
    }
}

fn high_congestion_count(
    route: &RouteCandidate,
    levels: &BTreeMap<JunctionId, CongestionLevel>,
) -> usize {
    route
        .matched_junctions
        .iter()
        .filter(|id| levels.get(*id) == Some(&CongestionLevel::High))
        .count()
}

/// Matches routes against fresh junctions and ranks them.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteScorer {
    matcher: ProximityMatcher,
}

impl RouteScorer {
    /// Create a scorer using `matcher` to find on-route junctions.
    #[must_use]
    pub const fn new(matcher: ProximityMatcher) -> Self {
        Self { matcher }
    }

    /// Proximity matcher in use.
    #[must_use]
    pub const fn matcher(&self) -> &ProximityMatcher {
        &self.matcher
    }

    /// Attach on-route junctions from `junctions` to each route, then rank.
    ///
    /// `junctions` must already be filtered to fresh entries.
    #[must_use]
    pub fn score(
        &self,
        routes: Vec<RouteCandidate>,
        junctions: &BTreeMap<JunctionId, JunctionState>,
    ) -> Ranking {
        let matched: Vec<RouteCandidate> = routes
            .into_iter()
            .map(|route| {
                let on_route = self.matcher.matches(&route.polyline, junctions.values());
                route.with_matched_junctions(on_route)
            })
            .collect();
        let levels: BTreeMap<JunctionId, CongestionLevel> = junctions
            .iter()
            .map(|(id, state)| (*id, state.congestion_level))
            .collect();
        rank(matched, &levels)
    }
}

#[cfg(test)]
mod tests;
