//! Tunables for the planner and the place-name resolver.

use std::time::Duration;

use trafficway_core::congestion::DEFAULT_VALIDITY_WINDOW;
use trafficway_core::proximity::DEFAULT_THRESHOLD_METERS;

/// Minimum time between a completed plan and a congestion-triggered replan.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(2);

/// Time after which a routing or geocoding request counts as failed.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Quiet period a query must survive before it reaches the geocoder.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Shortest query sent to the geocoder.
pub const DEFAULT_MIN_QUERY_CHARS: usize = 3;

/// Configuration for [`crate::RoutePlanningController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfig {
    /// Hysteresis applied to congestion-triggered replans.
    pub cooldown: Duration,
    /// Maximum junction observation age used for scoring.
    pub validity_window: Duration,
    /// Lateral distance within which a junction is on a route.
    pub threshold_meters: f64,
    /// Deadline for one routing request.
    pub request_timeout: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            validity_window: DEFAULT_VALIDITY_WINDOW,
            threshold_meters: DEFAULT_THRESHOLD_METERS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl PlannerConfig {
    /// Override the replan cooldown.
    #[must_use]
    pub const fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Override the junction validity window.
    #[must_use]
    pub const fn with_validity_window(mut self, window: Duration) -> Self {
        self.validity_window = window;
        self
    }

    /// Override the proximity threshold.
    #[must_use]
    pub const fn with_threshold_meters(mut self, meters: f64) -> Self {
        self.threshold_meters = meters;
        self
    }

    /// Override the routing request deadline.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Configuration for [`crate::GeoResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Calls closer together than this suppress all but the last.
    pub debounce: Duration,
    /// Queries shorter than this many characters never reach the geocoder.
    pub min_query_chars: usize,
    /// Deadline for one geocoding request.
    pub request_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ResolverConfig {
    /// Override the debounce interval.
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Override the minimum query length.
    #[must_use]
    pub const fn with_min_query_chars(mut self, chars: usize) -> Self {
        self.min_query_chars = chars;
        self
    }

    /// Override the geocoding request deadline.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
