//! Network adapters for the trafficway engine.
//!
//! Responsibilities:
//! - Implement the core provider traits over HTTP: [`routing`] for
//!   OSRM-compatible route services and [`geocoding`] for Nominatim-compatible
//!   search.
//! - Decode the live congestion feed into junction observations ([`feed`]).
//!
//! Boundaries:
//! - Do not encode planning or scoring rules (live in `trafficway-planner`
//!   and `trafficway-scorer`).
//! - Never block: every network call is asynchronous.
//!
//! Invariants:
//! - URLs carried in errors and logs never include credentials.
//! - No global mutable state.

pub mod feed;
pub mod geocoding;
mod http;
pub mod routing;

#[cfg(test)]
mod test_server;

pub use http::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, ProviderBuildError};
