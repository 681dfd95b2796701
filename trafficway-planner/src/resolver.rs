//! Debounced, fenced place-name lookup.
//!
//! Each text field that accepts a place name owns one [`GeoResolver`]. A call
//! to [`GeoResolver::resolve`] first waits out the debounce interval; if
//! another call arrived meanwhile, the earlier one yields
//! [`Suggestions::Superseded`] without touching the network. Responses that
//! return after a newer call was issued are dropped the same way, so
//! out-of-order replies never reach the caller. Dropping the returned future
//! cancels the lookup.

use log::{debug, warn};
use tokio::time::{sleep, timeout};
use trafficway_core::{GeocodedPlace, Geocoder, PlaceCandidate};

use crate::config::ResolverConfig;
use crate::fence::SequenceFence;

/// Result of one [`GeoResolver::resolve`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestions {
    /// Candidates for the latest query, possibly empty.
    Delivered(Vec<PlaceCandidate>),
    /// A newer call replaced this one; nothing should be shown.
    Superseded,
}

impl Suggestions {
    /// Delivered candidates, or `None` when superseded.
    #[must_use]
    pub fn into_candidates(self) -> Option<Vec<PlaceCandidate>> {
        match self {
            Self::Delivered(candidates) => Some(candidates),
            Self::Superseded => None,
        }
    }
}

/// Turns partial place names into ranked coordinate candidates.
#[derive(Debug)]
pub struct GeoResolver<G> {
    geocoder: G,
    config: ResolverConfig,
    fence: SequenceFence,
}

impl<G: Geocoder> GeoResolver<G> {
    /// Create a resolver with default debounce and timeout.
    pub fn new(geocoder: G) -> Self {
        Self::with_config(geocoder, ResolverConfig::default())
    }

    /// Create a resolver with explicit configuration.
    pub fn with_config(geocoder: G, config: ResolverConfig) -> Self {
        Self {
            geocoder,
            config,
            fence: SequenceFence::default(),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Look up `query`, superseding any earlier call on this resolver.
    ///
    /// Queries shorter than the configured minimum resolve to an empty list
    /// immediately. Geocoder failures and timeouts also resolve to an empty
    /// list; they are logged but never returned as errors.
    pub async fn resolve(&self, query: &str) -> Suggestions {
        let ticket = self.fence.issue();
        let trimmed = query.trim();
        if trimmed.chars().count() < self.config.min_query_chars {
            return Suggestions::Delivered(Vec::new());
        }

        sleep(self.config.debounce).await;
        if !self.fence.is_current(ticket) {
            debug!("query {trimmed:?} debounced");
            return Suggestions::Superseded;
        }

        let outcome = timeout(self.config.request_timeout, self.geocoder.geocode(trimmed)).await;
        if !self.fence.is_current(ticket) {
            debug!("dropping late geocoding reply for {trimmed:?}");
            return Suggestions::Superseded;
        }

        let places = match outcome {
            Ok(Ok(places)) => places,
            Ok(Err(error)) => {
                warn!("geocoding {trimmed:?} failed: {error}");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    "geocoding {trimmed:?} timed out after {}s",
                    self.config.request_timeout.as_secs()
                );
                Vec::new()
            }
        };
        Suggestions::Delivered(number_places(places))
    }
}

fn number_places(places: Vec<GeocodedPlace>) -> Vec<PlaceCandidate> {
    (1..)
        .zip(places)
        .map(|(id, place)| PlaceCandidate {
            id,
            point: place.point,
            display_name: place.display_name,
        })
        .collect()
}
