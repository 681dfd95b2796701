//! Human-readable explanation of a ranking.

use std::fmt;

use trafficway_core::{RouteCandidate, RouteId};

/// Why the recommended route was chosen.
///
/// The text always states the high-congestion count of the recommendation
/// when it is not zero, so a congested recommendation is never presented as
/// clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rationale {
    /// The provider returned no routes.
    NoRoutes,
    /// The recommended route passes no high-congestion junction.
    Clear {
        /// Recommended route.
        route_id: RouteId,
        /// Estimated travel time, rounded up to whole minutes.
        minutes: u64,
        /// High-congestion junctions on the fastest alternative that the
        /// recommendation avoids.
        avoided: usize,
    },
    /// Every route passes at least one high-congestion junction and the
    /// least congested one was picked.
    Congested {
        /// Recommended route.
        route_id: RouteId,
        /// High-congestion junctions on the recommendation.
        high_count: usize,
        /// Number of candidate routes.
        route_count: usize,
    },
}

impl Rationale {
    /// Describe the outcome of ranking `routes` with `recommended` on top.
    #[must_use]
    pub fn describe(routes: &[RouteCandidate], recommended: Option<RouteId>) -> Self {
        let Some(best) = recommended.and_then(|id| routes.iter().find(|route| route.id == id))
        else {
            return Self::NoRoutes;
        };
        if best.congestion_count > 0 {
            return Self::Congested {
                route_id: best.id,
                high_count: best.congestion_count,
                route_count: routes.len(),
            };
        }
        let fastest = routes
            .iter()
            .min_by(|a, b| a.duration_seconds.total_cmp(&b.duration_seconds));
        Self::Clear {
            route_id: best.id,
            minutes: best.duration().as_secs().div_ceil(60),
            avoided: fastest.map_or(0, |route| route.congestion_count),
        }
    }
}

fn junctions(count: usize) -> &'static str {
    if count == 1 { "junction" } else { "junctions" }
}

impl fmt::Display for Rationale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NoRoutes => f.write_str("No route is available between these points."),
            Self::Clear {
                route_id,
                minutes,
                avoided: 0,
            } => write!(
                f,
                "Route {route_id} is clear of heavy congestion (about {minutes} min)."
            ),
            Self::Clear {
                route_id,
                minutes,
                avoided,
            } => write!(
                f,
                "Route {route_id} is clear of heavy congestion (about {minutes} min) and avoids \
                 {avoided} heavily congested {} on the fastest alternative.",
                junctions(avoided)
            ),
            Self::Congested {
                route_id,
                high_count,
                route_count: 1,
            } => write!(
                f,
                "Route {route_id} is the only option and passes {high_count} heavily congested \
                 {}.",
                junctions(high_count)
            ),
            Self::Congested {
                route_id,
                high_count,
                route_count,
            } => write!(
                f,
                "All {route_count} routes pass heavy congestion; route {route_id} has the fewest \
                 with {high_count} heavily congested {}.",
                junctions(high_count)
            ),
        }
    }
}
