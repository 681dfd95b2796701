//! Core domain types for the Trafficway route planner.
//!
//! The crate defines the values exchanged between the planner and its
//! collaborators (points, junction observations, route candidates and plan
//! outcomes), the provider traits for geocoding and routing, the congestion
//! state cache fed by the live traffic feed, and the proximity matcher that
//! ties junctions to route geometry.
//!
//! Nothing here performs I/O. HTTP adapters live in `trafficway-data` and the
//! planning state machine in `trafficway-planner`.

pub mod congestion;
mod junction;
mod place;
mod planning;
mod point;
pub mod provider;
pub mod proximity;
mod route;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use junction::{
    CongestionLevel, HIGH_DENSITY_VEHICLES, JunctionId, JunctionState, ParseCongestionLevelError,
};
pub use place::{GeocodedPlace, PlaceCandidate};
pub use planning::{ControllerState, PlanOutcome, PlanTrigger, PlanningRequest};
pub use point::{GeoPoint, GeoPointError};
pub use provider::{GeocodeError, Geocoder, RoutingError, RoutingProvider};
pub use route::{ProviderRoute, RouteCandidate, RouteId, number_routes};
