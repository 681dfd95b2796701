//! Planning requests and the outcome contract handed to the presentation layer.

use std::fmt;

use crate::{GeoPoint, RouteCandidate, RouteId};

/// Why a planning request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlanTrigger {
    /// The user selected a new origin or destination.
    Input,
    /// Congestion changed for the active origin and destination.
    Congestion,
}

/// A route request tagged with its position in issue order.
///
/// Only the response to the request carrying the latest issued
/// `sequence_number` may update visible state.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanningRequest {
    /// Route start.
    pub origin: GeoPoint,
    /// Route end.
    pub destination: GeoPoint,
    /// Strictly increasing issue counter.
    pub sequence_number: u64,
    /// What caused the request.
    pub trigger: PlanTrigger,
}

/// Lifecycle state of the route planning controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControllerState {
    /// No origin/destination pair is active.
    #[default]
    Idle,
    /// Place names are being looked up.
    Resolving,
    /// A request for new endpoints is in flight.
    Planning,
    /// Routes are ranked and a recommendation is available.
    Settled,
    /// A congestion-triggered request is in flight.
    Replanning,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Planning => "planning",
            Self::Settled => "settled",
            Self::Replanning => "replanning",
        };
        f.write_str(label)
    }
}

/// Everything the presentation layer needs to render the current plan.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanOutcome {
    /// Identifier of the recommended route, if any route exists.
    pub recommended_route_id: Option<RouteId>,
    /// Ranked routes in provider order.
    pub routes: Vec<RouteCandidate>,
    /// Explanation of the recommendation or of a failure.
    pub rationale: String,
    /// Controller state when the outcome was produced.
    pub state: ControllerState,
}

impl PlanOutcome {
    /// Return the recommended route, if any.
    #[must_use]
    pub fn recommended(&self) -> Option<&RouteCandidate> {
        self.recommended_route_id
            .and_then(|id| self.routes.iter().find(|route| route.id == id))
    }
}
