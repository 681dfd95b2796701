//! Candidate routes between an origin and a destination.
//!
//! A routing provider returns [`ProviderRoute`]s; the planner wraps each in a
//! [`RouteCandidate`], attaches the junctions that lie on it and lets the
//! scorer flag the recommendation. Each step produces a new value.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::{GeoPoint, JunctionId};

/// Identifier of a route within one planning result.
///
/// Identifiers are 1-based positions in provider order.
pub type RouteId = u32;

/// One alternative as returned by the routing provider.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProviderRoute {
    /// Ordered route geometry.
    pub polyline: Vec<GeoPoint>,
    /// Route length in metres.
    pub distance_meters: f64,
    /// Estimated travel time in seconds.
    pub duration_seconds: f64,
}

/// A route option presented to the caller.
///
/// # Examples
///
/// ```
/// use trafficway_core::{GeoPoint, ProviderRoute, RouteCandidate};
///
/// let route = ProviderRoute {
///     polyline: vec![
///         GeoPoint { latitude: 51.50, longitude: -0.10 },
///         GeoPoint { latitude: 51.51, longitude: -0.08 },
///     ],
///     distance_meters: 1_900.0,
///     duration_seconds: 420.0,
/// };
/// let candidate = RouteCandidate::from_provider(1, route);
/// assert_eq!(candidate.congestion_count, 0);
/// assert!(!candidate.is_recommended);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteCandidate {
    /// Position in provider order, starting at 1.
    pub id: RouteId,
    /// Ordered route geometry.
    pub polyline: Vec<GeoPoint>,
    /// Route length in metres.
    pub distance_meters: f64,
    /// Estimated travel time in seconds.
    pub duration_seconds: f64,
    /// Fresh junctions within the proximity threshold, at any level.
    pub matched_junctions: BTreeSet<JunctionId>,
    /// Number of matched junctions currently at high congestion.
    pub congestion_count: usize,
    /// Whether the scorer selected this route.
    pub is_recommended: bool,
}

impl RouteCandidate {
    /// Wrap a provider route without any congestion information.
    #[must_use]
    pub fn from_provider(id: RouteId, route: ProviderRoute) -> Self {
        Self {
            id,
            polyline: route.polyline,
            distance_meters: route.distance_meters,
            duration_seconds: route.duration_seconds,
            matched_junctions: BTreeSet::new(),
            congestion_count: 0,
            is_recommended: false,
        }
    }

    /// Return a copy carrying `junctions` as its on-route set.
    #[must_use]
    pub fn with_matched_junctions(self, junctions: BTreeSet<JunctionId>) -> Self {
        Self {
            matched_junctions: junctions,
            ..self
        }
    }

    /// Return a copy with derived scoring fields replaced.
    #[must_use]
    pub fn with_score(self, congestion_count: usize, is_recommended: bool) -> Self {
        Self {
            congestion_count,
            is_recommended,
            ..self
        }
    }

    /// Estimated travel time, saturating invalid provider values to zero.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_seconds).unwrap_or(Duration::ZERO)
    }
}

/// Number each provider route in order, starting at 1.
#[must_use]
pub fn number_routes(routes: Vec<ProviderRoute>) -> Vec<RouteCandidate> {
    (1..)
        .zip(routes)
        .map(|(id, route)| RouteCandidate::from_provider(id, route))
        .collect()
}
