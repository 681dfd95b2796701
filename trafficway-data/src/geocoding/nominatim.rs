//! Nominatim search response types.
//!
//! The search endpoint with `format=jsonv2` answers with a JSON array of
//! places, best match first. Coordinates are encoded as decimal strings.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Search/>

use serde::Deserialize;

/// One place in a Nominatim search response.
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    /// Latitude as a decimal string.
    pub lat: String,
    /// Longitude as a decimal string.
    pub lon: String,
    /// Full human-readable address.
    pub display_name: String,
}
