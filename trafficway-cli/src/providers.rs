//! Provider construction for CLI commands.

use trafficway_core::{Geocoder, RoutingProvider};
use trafficway_data::geocoding::{HttpGeocoder, HttpGeocoderConfig};
use trafficway_data::routing::{HttpRoutingProvider, HttpRoutingProviderConfig};

use crate::CliError;

/// Builds the providers used by one CLI invocation.
///
/// Commands take the builder as a parameter so tests can swap the HTTP
/// adapters for in-process doubles.
pub(crate) trait ProviderBuilder {
    type Routing: RoutingProvider + 'static;
    type Geocoding: Geocoder;

    fn routing(&self, config: &HttpRoutingProviderConfig) -> Result<Self::Routing, CliError>;

    fn geocoder(&self, config: &HttpGeocoderConfig) -> Result<Self::Geocoding, CliError>;
}

/// Talks to OSRM- and Nominatim-compatible services over HTTP.
pub(crate) struct HttpProviders;

impl ProviderBuilder for HttpProviders {
    type Routing = HttpRoutingProvider;
    type Geocoding = HttpGeocoder;

    fn routing(&self, config: &HttpRoutingProviderConfig) -> Result<Self::Routing, CliError> {
        HttpRoutingProvider::with_config(config.clone()).map_err(|source| {
            CliError::BuildProvider {
                provider: "routing",
                base_url: config.base_url.clone(),
                source,
            }
        })
    }

    fn geocoder(&self, config: &HttpGeocoderConfig) -> Result<Self::Geocoding, CliError> {
        HttpGeocoder::with_config(config.clone()).map_err(|source| CliError::BuildProvider {
            provider: "geocoding",
            base_url: config.base_url.clone(),
            source,
        })
    }
}
