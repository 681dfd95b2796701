//! Test utilities for routing providers.
//!
//! This module provides [`StubRoutingProvider`], a deterministic test double
//! for [`RoutingProvider`] that returns pre-configured responses without
//! making actual HTTP requests.

use async_trait::async_trait;
use trafficway_core::{GeoPoint, ProviderRoute, RoutingError, RoutingProvider};

/// Stub `RoutingProvider` for testing.
///
/// This provider returns pre-configured responses, allowing tests to verify
/// behaviour without requiring a running OSRM service.
///
/// # Example
///
/// ```
/// use trafficway_data::routing::test_support::StubRoutingProvider;
/// use trafficway_core::{GeoPoint, RoutingError, RoutingProvider};
///
/// let provider = StubRoutingProvider::with_error(RoutingError::NoRoute);
/// let origin = GeoPoint::new(51.5, -0.1)?;
/// let runtime = tokio::runtime::Builder::new_current_thread().build()?;
/// let result = runtime.block_on(provider.routes(origin, origin));
/// assert_eq!(result, Err(RoutingError::NoRoute));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct StubRoutingProvider {
    response: StubResponse,
}

#[derive(Debug, Clone)]
enum StubResponse {
    StraightLine,
    Routes(Vec<ProviderRoute>),
    Error(RoutingError),
}

impl StubRoutingProvider {
    /// Create a provider that returns the given routes.
    ///
    /// The routes are returned regardless of the endpoints, as long as both
    /// are valid.
    #[must_use]
    pub fn with_routes(routes: Vec<ProviderRoute>) -> Self {
        Self {
            response: StubResponse::Routes(routes),
        }
    }

    /// Create a provider that returns the given error.
    ///
    /// Invalid endpoints still return `RoutingError::InvalidInput`.
    #[must_use]
    pub fn with_error(error: RoutingError) -> Self {
        Self {
            response: StubResponse::Error(error),
        }
    }

    /// Create a provider returning one straight route per call.
    ///
    /// The route runs directly from origin to destination and takes one
    /// minute.
    #[must_use]
    pub fn straight_line() -> Self {
        Self {
            response: StubResponse::StraightLine,
        }
    }
}

#[async_trait(?Send)]
impl RoutingProvider for StubRoutingProvider {
    async fn routes(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Vec<ProviderRoute>, RoutingError> {
        for point in [origin, destination] {
            point.validate().map_err(|err| RoutingError::InvalidInput {
                message: err.to_string(),
            })?;
        }

        match &self.response {
            StubResponse::StraightLine => Ok(vec![ProviderRoute {
                polyline: vec![origin, destination],
                distance_meters: 1_000.0,
                duration_seconds: 60.0,
            }]),
            StubResponse::Routes(routes) => Ok(routes.clone()),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }
}
