//! Planner failures surfaced to the caller.

use thiserror::Error;
use trafficway_core::RoutingError;

/// Fatal planner errors.
///
/// Transient provider failures, invalid input and stale responses never
/// appear here; they are reported through the plan outcome instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// The routing provider is missing credentials or cannot be reached.
    #[error("routing provider is misconfigured: {source}")]
    Configuration {
        /// Provider error that revealed the misconfiguration.
        #[source]
        source: RoutingError,
    },
}
