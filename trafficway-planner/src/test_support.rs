//! Test-only utilities for `trafficway-planner`.
//!
//! The providers here replay scripted responses after a scripted delay, which
//! lets tests under a paused Tokio clock construct any interleaving of
//! overlapping requests. They are gated behind the `test-support` feature
//! (and `cfg(test)`).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use trafficway_core::{
    GeoPoint, GeocodeError, GeocodedPlace, Geocoder, ProviderRoute, RoutingError, RoutingProvider,
};

type Script<T, E> = RefCell<VecDeque<(Duration, Result<T, E>)>>;

/// A [`RoutingProvider`] replaying scripted responses in call order.
///
/// Once the script is exhausted every call fails with
/// [`RoutingError::NoRoute`].
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use trafficway_planner::test_support::ScriptedRoutingProvider;
///
/// let provider = ScriptedRoutingProvider::default()
///     .respond(Duration::from_secs(5), Ok(Vec::new()))
///     .respond(Duration::from_secs(1), Ok(Vec::new()));
/// assert_eq!(provider.remaining(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedRoutingProvider {
    script: Script<Vec<ProviderRoute>, RoutingError>,
    requests: RefCell<Vec<(GeoPoint, GeoPoint)>>,
}

impl ScriptedRoutingProvider {
    /// Append a response delivered `delay` after the call.
    #[must_use]
    pub fn respond(
        self,
        delay: Duration,
        result: Result<Vec<ProviderRoute>, RoutingError>,
    ) -> Self {
        self.script.borrow_mut().push_back((delay, result));
        self
    }

    /// Append `count` immediate copies of `routes`.
    #[must_use]
    pub fn repeat(self, count: usize, routes: &[ProviderRoute]) -> Self {
        self.script
            .borrow_mut()
            .extend((0..count).map(|_| (Duration::ZERO, Ok(routes.to_vec()))));
        self
    }

    /// Scripted responses not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.borrow().len()
    }

    /// Origin and destination of every request received, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<(GeoPoint, GeoPoint)> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl RoutingProvider for ScriptedRoutingProvider {
    async fn routes(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Vec<ProviderRoute>, RoutingError> {
        self.requests.borrow_mut().push((origin, destination));
        let next = self.script.borrow_mut().pop_front();
        let Some((delay, result)) = next else {
            return Err(RoutingError::NoRoute);
        };
        sleep(delay).await;
        result
    }
}

/// A [`Geocoder`] replaying scripted responses in call order.
///
/// Once the script is exhausted every call returns no places.
#[derive(Debug, Default)]
pub struct ScriptedGeocoder {
    script: Script<Vec<GeocodedPlace>, GeocodeError>,
    queries: RefCell<Vec<String>>,
}

impl ScriptedGeocoder {
    /// Append a response delivered `delay` after the call.
    #[must_use]
    pub fn respond(
        self,
        delay: Duration,
        result: Result<Vec<GeocodedPlace>, GeocodeError>,
    ) -> Self {
        self.script.borrow_mut().push_back((delay, result));
        self
    }

    /// Every query received, in call order.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Geocoder for ScriptedGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodedPlace>, GeocodeError> {
        self.queries.borrow_mut().push(query.to_owned());
        let next = self.script.borrow_mut().pop_front();
        let Some((delay, result)) = next else {
            return Ok(Vec::new());
        };
        sleep(delay).await;
        result
    }
}

/// Points and routes for the central London scenario.
pub mod london {
    use trafficway_core::{GeoPoint, ProviderRoute};

    /// Scenario origin.
    pub const ORIGIN: GeoPoint = GeoPoint {
        latitude: 51.500,
        longitude: -0.10,
    };

    /// Scenario destination.
    pub const DESTINATION: GeoPoint = GeoPoint {
        latitude: 51.510,
        longitude: -0.08,
    };

    /// Corner of route Y, monitored as a junction. Over a kilometre from
    /// every point of route X.
    pub const NORTHERN_JUNCTION: GeoPoint = GeoPoint {
        latitude: 51.510,
        longitude: -0.10,
    };

    /// Route X: east along the river, then north. 600 seconds.
    #[must_use]
    pub fn route_x() -> ProviderRoute {
        ProviderRoute {
            polyline: vec![
                ORIGIN,
                GeoPoint {
                    latitude: 51.500,
                    longitude: -0.08,
                },
                DESTINATION,
            ],
            distance_meters: 3_400.0,
            duration_seconds: 600.0,
        }
    }

    /// Route Y: north, then east through [`NORTHERN_JUNCTION`]. 500 seconds.
    #[must_use]
    pub fn route_y() -> ProviderRoute {
        ProviderRoute {
            polyline: vec![ORIGIN, NORTHERN_JUNCTION, DESTINATION],
            distance_meters: 3_300.0,
            duration_seconds: 500.0,
        }
    }
}
