//! Facade crate for the trafficway route planner.
//!
//! This crate re-exports the core domain types, the route scorer and the
//! planning controller. The HTTP adapters for routing, geocoding and the
//! congestion feed sit behind the `http` feature.

#![forbid(unsafe_code)]

pub use trafficway_core::congestion::{
    CongestionStateCache, DEFAULT_VALIDITY_WINDOW, LevelChange, SharedCongestionCache,
};
pub use trafficway_core::proximity::{DEFAULT_THRESHOLD_METERS, PlanarScale, ProximityMatcher};
pub use trafficway_core::{
    CongestionLevel, ControllerState, GeoPoint, GeoPointError, GeocodeError, GeocodedPlace,
    Geocoder, JunctionId, JunctionState, PlaceCandidate, PlanOutcome, PlanTrigger,
    PlanningRequest, ProviderRoute, RouteCandidate, RouteId, RoutingError, RoutingProvider,
};

pub use trafficway_scorer::{Ranking, Rationale, RouteScorer, rank};

pub use trafficway_planner::{
    GeoResolver, PlannerCommand, PlannerConfig, PlannerError, PlannerLoop, PlannerStats,
    ResolverConfig, RoutePlanningController, Suggestions,
};

#[cfg(feature = "http")]
pub use trafficway_data::{
    ProviderBuildError,
    feed::{FeedError, decode_event, pump_events, read_events},
    geocoding::{HttpGeocoder, HttpGeocoderConfig},
    routing::{HttpRoutingProvider, HttpRoutingProviderConfig},
};
