//! HTTP-based geocoders.
//!
//! [`HttpGeocoder`] implements [`trafficway_core::Geocoder`] against a
//! Nominatim-compatible search endpoint. Wrap it in a
//! `trafficway_planner::GeoResolver` to get debouncing and stale-reply
//! suppression.

mod nominatim;
mod provider;

#[doc(hidden)]
pub mod test_support;

pub use provider::{DEFAULT_GEOCODER_BASE_URL, DEFAULT_LIMIT, HttpGeocoder, HttpGeocoderConfig};
