//! HTTP client construction shared by the routing and geocoding adapters.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

/// Default user agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "trafficway/0.1";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error returned when an HTTP adapter cannot be constructed.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The configured base URL does not parse.
    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        /// URL as configured.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// The provider is configured to require an API key and has none.
    #[error("{provider} requires an API key but none was configured")]
    MissingApiKey {
        /// Provider name.
        provider: &'static str,
    },
}

pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, ProviderBuildError> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .map_err(ProviderBuildError::HttpClient)
}

/// Render `error` and its causes without the request URL.
///
/// Request URLs may carry an API key in their query string.
pub(crate) fn describe(error: reqwest::Error) -> String {
    let stripped = error.without_url();
    let mut message = stripped.to_string();
    let mut cause = std::error::Error::source(&stripped);
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = inner.source();
    }
    message
}

/// Parse `base_url` joined with `path`, rejecting URLs that cannot carry one.
pub(crate) fn endpoint(base_url: &str, path: &str) -> Result<url::Url, ProviderBuildError> {
    let joined = format!("{}/{}", base_url.trim_end_matches('/'), path);
    let invalid = |source| ProviderBuildError::InvalidBaseUrl {
        url: base_url.to_owned(),
        source,
    };
    let url = url::Url::parse(&joined).map_err(invalid)?;
    if url.cannot_be_a_base() {
        return Err(invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase));
    }
    Ok(url)
}
