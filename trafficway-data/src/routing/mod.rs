//! HTTP-based routing providers.
//!
//! This module provides [`HttpRoutingProvider`], an implementation of
//! [`trafficway_core::RoutingProvider`] that fetches alternative routes from
//! an OSRM-compatible routing service.
//!
//! # Example
//!
//! ```no_run
//! use trafficway_data::routing::{HttpRoutingProvider, HttpRoutingProviderConfig};
//! use std::time::Duration;
//!
//! // Create a provider with custom configuration
//! let config = HttpRoutingProviderConfig::new("https://osrm.example.com")
//!     .with_profile("driving")
//!     .with_api_key("secret")
//!     .with_timeout(Duration::from_secs(5));
//! let provider = HttpRoutingProvider::with_config(config)?;
//!
//! // Or use the simple constructor
//! let provider = HttpRoutingProvider::new("http://localhost:5000")?;
//! # Ok::<(), trafficway_data::ProviderBuildError>(())
//! ```

mod osrm;
mod provider;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_PROFILE, DEFAULT_ROUTING_BASE_URL, HttpRoutingProvider, HttpRoutingProviderConfig,
    MAX_ALTERNATIVES,
};
