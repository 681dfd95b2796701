//! HTTP-based `RoutingProvider` using OSRM's Route API.
//!
//! This module provides [`HttpRoutingProvider`], an implementation of the
//! [`RoutingProvider`] trait that fetches alternative routes from an
//! OSRM-compatible routing service.
//!
//! # Error mapping
//!
//! | Failure | [`RoutingError`] |
//! |---------|------------------|
//! | connection refused, DNS failure | `Unreachable` |
//! | deadline exceeded | `Timeout` |
//! | HTTP 401/403 with a key configured | `Unauthorized` |
//! | HTTP 401/403 without a key | `MissingCredentials` |
//! | body code `NoRoute`, or no routes | `NoRoute` |
//! | other body code | `ServiceError` |
//! | other non-2xx status | `HttpError` |
//! | undecodable body or geometry | `ParseError` |
//!
//! # Example
//!
//! ```no_run
//! use trafficway_data::routing::{HttpRoutingProvider, HttpRoutingProviderConfig};
//! use trafficway_core::{GeoPoint, RoutingProvider};
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpRoutingProviderConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(5));
//! let provider = HttpRoutingProvider::with_config(config)?;
//! let routes = provider
//!     .routes(GeoPoint::new(51.5, -0.1)?, GeoPoint::new(51.51, -0.08)?)
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use trafficway_core::{GeoPoint, ProviderRoute, RoutingError, RoutingProvider};
use url::Url;

use super::osrm::{NO_ROUTE, Route, RouteResponse};
use crate::http::{
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, ProviderBuildError, build_client, describe, endpoint,
};

/// Default OSRM base URL.
pub const DEFAULT_ROUTING_BASE_URL: &str = "http://localhost:5000";

/// Default OSRM routing profile.
pub const DEFAULT_PROFILE: &str = "driving";

/// Most alternatives handed to the planner.
pub const MAX_ALTERNATIVES: usize = 3;

const PROVIDER_NAME: &str = "osrm";

/// Configuration for [`HttpRoutingProvider`].
#[derive(Clone)]
pub struct HttpRoutingProviderConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Routing profile path segment.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Key sent as the `api_key` query parameter.
    pub api_key: Option<String>,
    /// Refuse to build without an API key.
    pub require_api_key: bool,
}

impl std::fmt::Debug for HttpRoutingProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRoutingProviderConfig")
            .field("base_url", &self.base_url)
            .field("profile", &self.profile)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("require_api_key", &self.require_api_key)
            .finish()
    }
}

impl Default for HttpRoutingProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ROUTING_BASE_URL.to_owned(),
            profile: DEFAULT_PROFILE.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            api_key: None,
            require_api_key: false,
        }
    }
}

impl HttpRoutingProviderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
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

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Require an API key at construction time.
    #[must_use]
    pub fn with_required_api_key(mut self, required: bool) -> Self {
        self.require_api_key = required;
        self
    }
}

/// HTTP routing provider using the OSRM Route API.
#[derive(Debug)]
pub struct HttpRoutingProvider {
    client: Client,
    config: HttpRoutingProviderConfig,
}

impl HttpRoutingProvider {
    /// Create a new provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpRoutingProviderConfig::new(base_url))
    }

    /// Create a new provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid, an API key is required
    /// but absent, or the HTTP client fails to build.
    pub fn with_config(config: HttpRoutingProviderConfig) -> Result<Self, ProviderBuildError> {
        if config.require_api_key && config.api_key.is_none() {
            return Err(ProviderBuildError::MissingApiKey {
                provider: PROVIDER_NAME,
            });
        }
        endpoint(&config.base_url, "route/v1")?;
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self { client, config })
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &HttpRoutingProviderConfig {
        &self.config
    }

    /// Build the OSRM Route API URL, without credentials.
    ///
    /// The URL format is:
    /// `{base_url}/route/v1/{profile}/{lon},{lat};{lon},{lat}?alternatives=true&overview=full&geometries=geojson`.
    fn build_route_url(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Url, RoutingError> {
        let path = format!(
            "route/v1/{}/{},{};{},{}",
            self.config.profile,
            origin.longitude,
            origin.latitude,
            destination.longitude,
            destination.latitude
        );
        let mut url =
            endpoint(&self.config.base_url, &path).map_err(|err| RoutingError::InvalidInput {
                message: err.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("alternatives", "true")
            .append_pair("overview", "full")
            .append_pair("geometries", "geojson");
        Ok(url)
    }

    async fn fetch_routes(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Vec<ProviderRoute>, RoutingError> {
        validate("origin", origin)?;
        validate("destination", destination)?;
        let mut url = self.build_route_url(origin, destination)?;
        let public = url.to_string();
        if let Some(key) = &self.config.api_key {
            url.query_pairs_mut().append_pair("api_key", key);
        }

        debug!("requesting routes from {public}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &public))?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(self.credentials_error(public, status));
        }
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &public))?;
        let decoded = serde_json::from_str::<RouteResponse>(&body);

        if !status.is_success() {
            // OSRM reports query failures as 4xx with a coded body.
            return Err(match decoded {
                Ok(parsed) if !parsed.is_ok() => service_error(parsed),
                _ => RoutingError::HttpError {
                    url: public,
                    status: status.as_u16(),
                    message: status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_owned(),
                },
            });
        }

        let parsed = decoded.map_err(|err| RoutingError::ParseError {
            message: err.to_string(),
        })?;
        convert_response(parsed)
    }

    fn credentials_error(&self, url: String, status: StatusCode) -> RoutingError {
        if self.config.api_key.is_some() {
            RoutingError::Unauthorized {
                url,
                status: status.as_u16(),
            }
        } else {
            RoutingError::MissingCredentials {
                provider: PROVIDER_NAME.to_owned(),
            }
        }
    }

    /// Convert a reqwest error to a `RoutingError`.
    fn convert_reqwest_error(&self, error: reqwest::Error, url: &str) -> RoutingError {
        if error.is_timeout() {
            return RoutingError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if error.is_connect() {
            return RoutingError::Unreachable {
                url: url.to_owned(),
                message: describe(error),
            };
        }

        RoutingError::NetworkError {
            url: url.to_owned(),
            message: describe(error),
        }
    }
}

#[async_trait(?Send)]
impl RoutingProvider for HttpRoutingProvider {
    async fn routes(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Vec<ProviderRoute>, RoutingError> {
        self.fetch_routes(origin, destination).await
    }
}

fn validate(field: &str, point: GeoPoint) -> Result<(), RoutingError> {
    point.validate().map_err(|err| RoutingError::InvalidInput {
        message: format!("{field}: {err}"),
    })
}

fn service_error(response: RouteResponse) -> RoutingError {
    if response.code == NO_ROUTE {
        return RoutingError::NoRoute;
    }
    RoutingError::ServiceError {
        code: response.code,
        message: response.message.unwrap_or_default(),
    }
}

/// Convert an OSRM response to provider routes in service order.
fn convert_response(response: RouteResponse) -> Result<Vec<ProviderRoute>, RoutingError> {
    if !response.is_ok() {
        return Err(service_error(response));
    }
    if response.routes.is_empty() {
        return Err(RoutingError::NoRoute);
    }
    response
        .routes
        .into_iter()
        .take(MAX_ALTERNATIVES)
        .map(convert_route)
        .collect()
}

fn convert_route(route: Route) -> Result<ProviderRoute, RoutingError> {
    let measures_valid = [route.distance, route.duration]
        .iter()
        .all(|value| value.is_finite() && *value >= 0.0);
    if !measures_valid {
        return Err(RoutingError::ParseError {
            message: format!(
                "route has invalid distance {} or duration {}",
                route.distance, route.duration
            ),
        });
    }
    let polyline = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[longitude, latitude]| GeoPoint::new(latitude, longitude))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| RoutingError::ParseError {
            message: format!("invalid route geometry: {err}"),
        })?;
    if polyline.is_empty() {
        return Err(RoutingError::ParseError {
            message: "route geometry has no coordinates".to_owned(),
        });
    }
    Ok(ProviderRoute {
        polyline,
        distance_meters: route.distance,
        duration_seconds: route.duration,
    })
}
