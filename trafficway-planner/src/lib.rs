#![forbid(unsafe_code)]
//! Congestion-aware route planning for trafficway.
//!
//! This crate turns user input and congestion updates into ranked route
//! plans:
//!
//! - [`GeoResolver`] debounces place-name lookups and drops superseded
//!   replies.
//! - [`RoutePlanningController`] owns the planning state machine, applies
//!   replan hysteresis and fences responses by sequence number.
//! - [`PlannerLoop`] drives a controller from a command channel on a single
//!   task and publishes every [`PlanOutcome`](trafficway_core::PlanOutcome)
//!   change.
//!
//! Everything here is single-threaded: providers use `?Send` futures and the
//! congestion cache is shared through `Rc`. Run the loop on a current-thread
//! runtime or inside a `LocalSet`.

mod config;
mod controller;
mod error;
mod event_loop;
mod fence;
mod resolver;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{
    DEFAULT_COOLDOWN, DEFAULT_DEBOUNCE, DEFAULT_MIN_QUERY_CHARS, DEFAULT_REQUEST_TIMEOUT,
    PlannerConfig, ResolverConfig,
};
pub use controller::{Applied, PlannerStats, RoutePlanningController, RouteResponse, WallClock};
pub use error::PlannerError;
pub use event_loop::{PlannerCommand, PlannerLoop};
pub use fence::SequenceFence;
pub use resolver::{GeoResolver, Suggestions};
