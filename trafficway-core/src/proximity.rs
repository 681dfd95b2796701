//! Junction-to-route proximity tests.
//!
//! Distances use a flat-earth projection: degrees are converted to metres
//! with a fixed [`PlanarScale`]. The approximation holds at city scale and
//! degrades far from the latitude the scale was chosen for; callers that need
//! a better fit can build a scale with [`PlanarScale::at_latitude`].

use std::collections::BTreeSet;

use geo::Coord;

use crate::{GeoPoint, JunctionId, JunctionState};

/// Default lateral distance within which a junction counts as on-route.
pub const DEFAULT_THRESHOLD_METERS: f64 = 500.0;

/// Metres spanned by one degree of latitude.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Degree to metre conversion factors for the planar approximation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarScale {
    /// Metres per degree along the meridian.
    pub meters_per_degree_latitude: f64,
    /// Metres per degree along the parallel.
    pub meters_per_degree_longitude: f64,
}

impl Default for PlanarScale {
    fn default() -> Self {
        Self {
            meters_per_degree_latitude: METERS_PER_DEGREE,
            meters_per_degree_longitude: METERS_PER_DEGREE,
        }
    }
}

impl PlanarScale {
    /// Scale whose longitude factor is corrected for `latitude` degrees.
    #[must_use]
    pub fn at_latitude(latitude: f64) -> Self {
        Self {
            meters_per_degree_latitude: METERS_PER_DEGREE,
            meters_per_degree_longitude: METERS_PER_DEGREE * latitude.to_radians().cos(),
        }
    }

    fn project(self, point: GeoPoint) -> Coord<f64> {
        Coord {
            x: point.longitude * self.meters_per_degree_longitude,
            y: point.latitude * self.meters_per_degree_latitude,
        }
    }
}

/// Decides which junctions lie along a route polyline.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use trafficway_core::proximity::ProximityMatcher;
/// use trafficway_core::{CongestionLevel, GeoPoint, JunctionState};
///
/// let route = [
///     GeoPoint { latitude: 51.500, longitude: -0.10 },
///     GeoPoint { latitude: 51.510, longitude: -0.08 },
/// ];
/// let junction = JunctionState {
///     id: 9,
///     point: route[0],
///     congestion_level: CongestionLevel::High,
///     vehicle_count: 22,
///     observed_at: Utc::now(),
/// };
/// let matched = ProximityMatcher::default().matches(&route, [&junction]);
/// assert!(matched.contains(&9));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityMatcher {
    threshold_meters: f64,
    scale: PlanarScale,
}

impl Default for ProximityMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_METERS)
    }
}

impl ProximityMatcher {
    /// Create a matcher with the given threshold and the default scale.
    #[must_use]
    pub fn new(threshold_meters: f64) -> Self {
        Self {
            threshold_meters,
            scale: PlanarScale::default(),
        }
    }

    /// Replace the degree to metre conversion.
    #[must_use]
    pub fn with_scale(self, scale: PlanarScale) -> Self {
        Self { scale, ..self }
    }

    /// Lateral threshold in metres.
    #[must_use]
    pub const fn threshold_meters(&self) -> f64 {
        self.threshold_meters
    }

    /// Identifiers of junctions within the threshold of any route segment.
    ///
    /// An empty route matches nothing. A single-point route is treated as a
    /// degenerate segment.
    #[must_use]
    pub fn matches<'a, I>(&self, route: &[GeoPoint], junctions: I) -> BTreeSet<JunctionId>
    where
        I: IntoIterator<Item = &'a JunctionState>,
    {
        junctions
            .into_iter()
            .filter(|junction| self.is_near(route, junction.point))
            .map(|junction| junction.id)
            .collect()
    }

    /// Whether `point` lies within the threshold of `route`.
    #[must_use]
    pub fn is_near(&self, route: &[GeoPoint], point: GeoPoint) -> bool {
        let target = self.scale.project(point);
        segments(route).any(|(start, end)| {
            let distance =
                segment_distance(target, self.scale.project(start), self.scale.project(end));
            distance <= self.threshold_meters
        })
    }

    /// Minimum planar distance in metres from `point` to `route`.
    ///
    /// Returns `None` for an empty route.
    #[must_use]
    pub fn distance_to_route_meters(&self, route: &[GeoPoint], point: GeoPoint) -> Option<f64> {
        let target = self.scale.project(point);
        segments(route)
            .map(|(start, end)| {
                segment_distance(target, self.scale.project(start), self.scale.project(end))
            })
            .min_by(f64::total_cmp)
    }
}

fn segments(route: &[GeoPoint]) -> impl Iterator<Item = (GeoPoint, GeoPoint)> + '_ {
    let single = match route {
        [only] => Some((*only, *only)),
        _ => None,
    };
    route
        .windows(2)
        .filter_map(|pair| match pair {
            [start, end] => Some((*start, *end)),
            _ => None,
        })
        .chain(single)
}

fn segment_distance(point: Coord<f64>, start: Coord<f64>, end: Coord<f64>) -> f64 {
    let span = end - start;
    let offset = point - start;
    let length_sq = dot(span, span);
    let t = if length_sq > 0.0 {
        (dot(offset, span) / length_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = start + span * t;
    let gap = point - closest;
    gap.x.hypot(gap.y)
}

fn dot(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x.mul_add(b.x, a.y * b.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CongestionLevel;
    use chrono::Utc;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn route() -> Vec<GeoPoint> {
        vec![
            GeoPoint {
                latitude: 51.500,
                longitude: -0.10,
            },
            GeoPoint {
                latitude: 51.505,
                longitude: -0.09,
            },
            GeoPoint {
                latitude: 51.510,
                longitude: -0.08,
            },
        ]
    }

    fn junction_at(id: JunctionId, point: GeoPoint) -> JunctionState {
        JunctionState {
            id,
            point,
            congestion_level: CongestionLevel::High,
            vehicle_count: 20,
            observed_at: Utc::now(),
        }
    }

    fn north_of(point: GeoPoint, meters: f64) -> GeoPoint {
        GeoPoint {
            latitude: point.latitude + meters / METERS_PER_DEGREE,
            longitude: point.longitude,
        }
    }

    #[rstest]
    fn vertices_always_match(route: Vec<GeoPoint>) {
        let junctions: Vec<_> = (1..)
            .zip(route.iter().copied())
            .map(|(id, point)| junction_at(id, point))
            .collect();
        let matched = ProximityMatcher::default().matches(&route, &junctions);
        assert_eq!(matched, BTreeSet::from([1, 2, 3]));
    }

    #[rstest]
    #[case(499.0, true)]
    #[case(500.0 + 1e-3, false)]
    #[case(2_000.0, false)]
    fn threshold_bounds_lateral_distance(#[case] offset: f64, #[case] expected: bool) {
        // A horizontal segment keeps the northward offset perpendicular.
        let route = [
            GeoPoint {
                latitude: 51.5,
                longitude: -0.12,
            },
            GeoPoint {
                latitude: 51.5,
                longitude: -0.08,
            },
        ];
        let midpoint = GeoPoint {
            latitude: 51.5,
            longitude: -0.10,
        };
        let junction = junction_at(7, north_of(midpoint, offset));
        let matched = ProximityMatcher::default().matches(&route, [&junction]);
        assert_eq!(matched.contains(&7), expected);
    }

    #[rstest]
    fn empty_route_matches_nothing(route: Vec<GeoPoint>) {
        let junction = junction_at(1, route[0]);
        assert!(ProximityMatcher::default().matches(&[], [&junction]).is_empty());
        assert_eq!(
            ProximityMatcher::default().distance_to_route_meters(&[], route[0]),
            None
        );
    }

    #[rstest]
    fn single_point_route_matches_nearby_junctions(route: Vec<GeoPoint>) {
        let origin = route[0];
        let near = junction_at(1, north_of(origin, 100.0));
        let far = junction_at(2, north_of(origin, 900.0));
        let matched = ProximityMatcher::default().matches(&[origin], [&near, &far]);
        assert_eq!(matched, BTreeSet::from([1]));
    }

    #[rstest]
    fn beyond_segment_end_measures_to_endpoint() {
        let route = [
            GeoPoint {
                latitude: 0.0,
                longitude: 0.0,
            },
            GeoPoint {
                latitude: 0.0,
                longitude: 0.01,
            },
        ];
        let past_end = GeoPoint {
            latitude: 0.0,
            longitude: 0.02,
        };
        let distance = ProximityMatcher::default()
            .distance_to_route_meters(&route, past_end)
            .expect("route has segments");
        assert!((distance - 1_113.2).abs() < 0.01);
    }

    #[rstest]
    fn latitude_corrected_scale_shrinks_longitude() {
        let scale = PlanarScale::at_latitude(60.0);
        assert!((scale.meters_per_degree_longitude - METERS_PER_DEGREE / 2.0).abs() < 1.0);
        assert_eq!(scale.meters_per_degree_latitude, METERS_PER_DEGREE);
    }

    proptest! {
        #[test]
        fn any_vertex_is_matched(
            points in prop::collection::vec((-60.0f64..60.0, -170.0f64..170.0), 1..20),
            pick in any::<prop::sample::Index>(),
        ) {
            let route: Vec<GeoPoint> = points
                .into_iter()
                .map(|(latitude, longitude)| GeoPoint { latitude, longitude })
                .collect();
            let vertex = route[pick.index(route.len())];
            prop_assert!(ProximityMatcher::default().is_near(&route, vertex));
        }
    }
}
