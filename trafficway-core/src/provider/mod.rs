//! Boundaries to the external geocoding and routing services.
//!
//! The [`Geocoder`] and [`RoutingProvider`] traits abstract the two
//! request/response services the planner depends on. Both are asynchronous
//! and single-threaded (`?Send`): the planner drives them cooperatively from
//! one task and never blocks waiting on a reply.
//!
//! Errors are split by how the caller must react. Geocoding failures are
//! always recoverable. Routing failures are either transient or a
//! configuration problem, see [`RoutingError::is_configuration_error`].

mod error;
mod geocoding;
mod routing;

pub use error::{GeocodeError, RoutingError};
pub use geocoding::Geocoder;
pub use routing::RoutingProvider;
