//! Routing provider trait.

use async_trait::async_trait;

use crate::{GeoPoint, ProviderRoute};

use super::error::RoutingError;

/// Fetch alternative routes between two points.
///
/// Implementations request alternatives from the service and return between
/// one and three routes in the service's own preference order. An empty
/// result is reported as [`RoutingError::NoRoute`].
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use trafficway_core::{GeoPoint, ProviderRoute, RoutingError, RoutingProvider};
///
/// struct StraightLine;
///
/// #[async_trait(?Send)]
/// impl RoutingProvider for StraightLine {
///     async fn routes(
///         &self,
///         origin: GeoPoint,
///         destination: GeoPoint,
///     ) -> Result<Vec<ProviderRoute>, RoutingError> {
///         Ok(vec![ProviderRoute {
///             polyline: vec![origin, destination],
///             distance_meters: 1_000.0,
///             duration_seconds: 120.0,
///         }])
///     }
/// }
/// ```
#[async_trait(?Send)]
pub trait RoutingProvider {
    /// Return alternative routes from `origin` to `destination`.
    async fn routes(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Vec<ProviderRoute>, RoutingError>;
}
