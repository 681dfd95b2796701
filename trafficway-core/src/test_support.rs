//! Test-only providers and fixtures used by unit and behaviour tests.

use std::cell::Cell;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    CongestionLevel, GeoPoint, GeocodeError, GeocodedPlace, Geocoder, JunctionId, JunctionState,
    ProviderRoute, RoutingError, RoutingProvider,
};

/// `RoutingProvider` that answers every request with the same result.
///
/// The provider counts calls so tests can assert on request volume.
#[derive(Debug)]
pub struct FixedRoutingProvider {
    result: Result<Vec<ProviderRoute>, RoutingError>,
    calls: Cell<usize>,
}

impl FixedRoutingProvider {
    /// Always return `routes`.
    #[must_use]
    pub fn with_routes(routes: Vec<ProviderRoute>) -> Self {
        Self {
            result: Ok(routes),
            calls: Cell::new(0),
        }
    }

    /// Always fail with `error`.
    #[must_use]
    pub fn failing(error: RoutingError) -> Self {
        Self {
            result: Err(error),
            calls: Cell::new(0),
        }
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

#[async_trait(?Send)]
impl RoutingProvider for FixedRoutingProvider {
    async fn routes(
        &self,
        _origin: GeoPoint,
        _destination: GeoPoint,
    ) -> Result<Vec<ProviderRoute>, RoutingError> {
        self.calls.set(self.calls.get() + 1);
        self.result.clone()
    }
}

/// `Geocoder` returning a fixed list of places for every query.
#[derive(Debug, Default)]
pub struct FixedGeocoder {
    places: Vec<GeocodedPlace>,
    calls: Cell<usize>,
}

impl FixedGeocoder {
    /// Answer every query with `places`.
    #[must_use]
    pub fn with_places(places: Vec<GeocodedPlace>) -> Self {
        Self {
            places,
            calls: Cell::new(0),
        }
    }

    /// Number of queries received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

#[async_trait(?Send)]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, _query: &str) -> Result<Vec<GeocodedPlace>, GeocodeError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.places.clone())
    }
}

/// Build a junction observation.
#[must_use]
pub fn junction(
    id: JunctionId,
    point: GeoPoint,
    congestion_level: CongestionLevel,
    observed_at: DateTime<Utc>,
) -> JunctionState {
    JunctionState {
        id,
        point,
        congestion_level,
        vehicle_count: match congestion_level {
            CongestionLevel::Low => 2,
            CongestionLevel::Medium => 8,
            CongestionLevel::High => 20,
        },
        observed_at,
    }
}

/// Build a provider route with a straight two-point polyline.
#[must_use]
pub fn straight_route(from: GeoPoint, to: GeoPoint, duration_seconds: f64) -> ProviderRoute {
    ProviderRoute {
        polyline: vec![from, to],
        distance_meters: 1_000.0,
        duration_seconds,
    }
}
