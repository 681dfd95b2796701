//! Geocoder trait.

use async_trait::async_trait;

use crate::GeocodedPlace;

use super::error::GeocodeError;

/// Resolve free text to places, best match first.
#[async_trait(?Send)]
pub trait Geocoder {
    /// Return places matching `query` in the service's ranking order.
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodedPlace>, GeocodeError>;
}
