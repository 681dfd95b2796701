use thiserror::Error;

/// Errors from [`crate::provider::RoutingProvider::routes`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// Origin or destination failed validation before any request was sent.
    #[error("invalid routing input: {message}")]
    InvalidInput {
        /// Description of the rejected input.
        message: String,
    },
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL (without credentials).
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
    /// The service answered with a non-success status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    HttpError {
        /// Request URL (without credentials).
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },
    /// The connection broke after it was established.
    #[error("network error calling {url}: {message}")]
    NetworkError {
        /// Request URL (without credentials).
        url: String,
        /// Error detail.
        message: String,
    },
    /// The service reported a failure in its response body.
    #[error("routing service returned {code}: {message}")]
    ServiceError {
        /// Service status code.
        code: String,
        /// Service message.
        message: String,
    },
    /// No route connects the two points.
    #[error("no route between origin and destination")]
    NoRoute,
    /// The response body could not be decoded.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Decoder error detail.
        message: String,
    },
    /// The provider needs an API key and none was configured.
    #[error("routing provider {provider} requires an API key")]
    MissingCredentials {
        /// Provider name.
        provider: String,
    },
    /// The service rejected the configured credentials.
    #[error("routing provider rejected credentials for {url} (HTTP {status})")]
    Unauthorized {
        /// Request URL (without credentials).
        url: String,
        /// HTTP status code (401 or 403).
        status: u16,
    },
    /// No connection could be made to the service at all.
    #[error("routing provider at {url} is unreachable: {message}")]
    Unreachable {
        /// Request URL (without credentials).
        url: String,
        /// Error detail.
        message: String,
    },
}

impl RoutingError {
    /// Whether the failure stems from provider configuration rather than a
    /// single request.
    ///
    /// Configuration failures halt planning; every other variant is reported
    /// through the plan rationale and planning continues with the next input.
    ///
    /// # Examples
    ///
    /// ```
    /// use trafficway_core::RoutingError;
    ///
    /// assert!(RoutingError::MissingCredentials { provider: "osrm".into() }.is_configuration_error());
    /// assert!(!RoutingError::NoRoute.is_configuration_error());
    /// ```
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials { .. } | Self::Unauthorized { .. } | Self::Unreachable { .. }
        )
    }
}

/// Errors from [`crate::provider::Geocoder::geocode`].
///
/// Callers convert every variant into an empty suggestion list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The request did not complete within the configured timeout.
    #[error("geocoding request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
    /// The service answered with a non-success status.
    #[error("geocoding request to {url} failed with HTTP {status}")]
    HttpError {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// Transport-level failure.
    #[error("network error calling {url}: {message}")]
    NetworkError {
        /// Request URL.
        url: String,
        /// Error detail.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse geocoding response: {message}")]
    ParseError {
        /// Decoder error detail.
        message: String,
    },
}
