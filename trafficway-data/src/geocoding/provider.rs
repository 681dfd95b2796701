//! HTTP-based `Geocoder` using the Nominatim search API.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use trafficway_core::{GeoPoint, GeocodeError, GeocodedPlace, Geocoder};
use url::Url;

use super::nominatim::SearchResult;
use crate::http::{
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, ProviderBuildError, build_client, describe, endpoint,
};

/// Default Nominatim base URL.
pub const DEFAULT_GEOCODER_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default number of places requested per query.
pub const DEFAULT_LIMIT: u8 = 5;

/// Configuration for [`HttpGeocoder`].
#[derive(Debug, Clone)]
pub struct HttpGeocoderConfig {
    /// Base URL for the Nominatim service.
    pub base_url: String,
    /// Maximum places requested per query.
    pub limit: u8,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests. Public Nominatim instances reject
    /// requests without an identifying agent.
    pub user_agent: String,
}

impl Default for HttpGeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_BASE_URL.to_owned(),
            limit: DEFAULT_LIMIT,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpGeocoderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the result limit.
    #[must_use]
    pub fn with_limit(mut self, limit: u8) -> Self {
        self.limit = limit;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP geocoder speaking the Nominatim search API.
#[derive(Debug)]
pub struct HttpGeocoder {
    client: Client,
    search: Url,
    config: HttpGeocoderConfig,
}

impl HttpGeocoder {
    /// Create a geocoder with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpGeocoderConfig::new(base_url))
    }

    /// Create a geocoder with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn with_config(config: HttpGeocoderConfig) -> Result<Self, ProviderBuildError> {
        let search = endpoint(&config.base_url, "search")?;
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            search,
            config,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &HttpGeocoderConfig {
        &self.config
    }

    /// Build the search URL: `{base_url}/search?q={query}&format=jsonv2&limit={limit}`.
    fn build_search_url(&self, query: &str) -> Url {
        let mut url = self.search.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "jsonv2")
            .append_pair("limit", &self.config.limit.to_string());
        url
    }

    fn convert_reqwest_error(&self, error: reqwest::Error, url: &str) -> GeocodeError {
        if error.is_timeout() {
            return GeocodeError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return GeocodeError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
            };
        }
        GeocodeError::NetworkError {
            url: url.to_owned(),
            message: describe(error),
        }
    }
}

#[async_trait(?Send)]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodedPlace>, GeocodeError> {
        let url = self.build_search_url(query);
        let public = url.to_string();
        debug!("geocoding via {public}");

        let results: Vec<SearchResult> = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &public))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err, &public))?
            .json()
            .await
            .map_err(|err| GeocodeError::ParseError {
                message: describe(err),
            })?;

        results.into_iter().map(convert_result).collect()
    }
}

fn convert_result(result: SearchResult) -> Result<GeocodedPlace, GeocodeError> {
    let parse = |field: &str, text: &str| {
        text.trim()
            .parse::<f64>()
            .map_err(|err| GeocodeError::ParseError {
                message: format!("{field} {text:?}: {err}"),
            })
    };
    let latitude = parse("latitude", &result.lat)?;
    let longitude = parse("longitude", &result.lon)?;
    let point = GeoPoint::new(latitude, longitude).map_err(|err| GeocodeError::ParseError {
        message: format!("place {:?}: {err}", result.display_name),
    })?;
    Ok(GeocodedPlace {
        point,
        display_name: result.display_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{refused_base_url, serve_once};
    use rstest::rstest;

    fn result(lat: &str, lon: &str) -> SearchResult {
        SearchResult {
            lat: lat.to_owned(),
            lon: lon.to_owned(),
            display_name: "Hitech City, Hyderabad".to_owned(),
        }
    }

    #[rstest]
    fn build_search_url_encodes_query() {
        let config = HttpGeocoderConfig::new("https://geo.example.com/").with_limit(3);
        let geocoder = HttpGeocoder::with_config(config).expect("geocoder should build");

        let url = geocoder.build_search_url("Banjara Hills & Road 12");

        assert_eq!(
            url.as_str(),
            "https://geo.example.com/search?q=Banjara+Hills+%26+Road+12&format=jsonv2&limit=3"
        );
    }

    #[rstest]
    fn convert_result_parses_string_coordinates() {
        let place = convert_result(result("17.4435", " 78.3772")).expect("should convert");
        assert_eq!(
            place.point,
            GeoPoint {
                latitude: 17.4435,
                longitude: 78.3772,
            }
        );
    }

    #[rstest]
    #[case("north", "78.3")]
    #[case("17.4", "")]
    #[case("95.0", "78.3")]
    fn convert_result_rejects_bad_coordinates(#[case] lat: &str, #[case] lon: &str) {
        let err = convert_result(result(lat, lon)).expect_err("should fail");
        assert!(matches!(err, GeocodeError::ParseError { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn geocode_returns_places_in_service_order() {
        let (base, request) = serve_once(
            "200 OK",
            r#"[{"lat": "17.3616", "lon": "78.4747", "display_name": "Charminar"},
                {"lat": "17.3604", "lon": "78.4736", "display_name": "Charminar Bus Stand"}]"#,
        )
        .await;
        let geocoder = HttpGeocoder::new(base).expect("geocoder should build");

        let places = geocoder.geocode("Charminar").await.expect("should succeed");

        let names: Vec<&str> = places.iter().map(|p| p.display_name.as_str()).collect();
        assert_eq!(names, vec!["Charminar", "Charminar Bus Stand"]);
        let request_line = request.await.expect("server saw the request");
        assert!(request_line.starts_with("GET /search?q=Charminar&format=jsonv2&limit=5"));
    }

    #[rstest]
    #[tokio::test]
    async fn geocode_maps_status_failures() {
        let (base, _request) = serve_once("429 Too Many Requests", "[]").await;
        let geocoder = HttpGeocoder::new(base).expect("geocoder should build");

        let err = geocoder.geocode("Charminar").await.expect_err("should fail");

        assert!(matches!(err, GeocodeError::HttpError { status: 429, .. }), "{err:?}");
    }

    #[rstest]
    #[tokio::test]
    async fn geocode_maps_connection_failures() {
        let geocoder = HttpGeocoder::new(refused_base_url().await).expect("geocoder should build");

        let err = geocoder.geocode("Charminar").await.expect_err("should fail");

        assert!(matches!(err, GeocodeError::NetworkError { .. }), "{err:?}");
    }
}
