//! Live state of monitored junctions.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::GeoPoint;

/// Identifier of a monitored junction as assigned by the traffic feed.
pub type JunctionId = u64;

/// Vehicle count above which a junction is classified as [`CongestionLevel::High`].
pub const HIGH_DENSITY_VEHICLES: u32 = 15;

/// Categorical traffic state of a junction.
///
/// The ordering follows severity, so `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CongestionLevel {
    /// Free-flowing traffic.
    Low,
    /// Slowed but moving traffic.
    Medium,
    /// Heavy congestion; routes through it are penalised.
    High,
}

impl CongestionLevel {
    /// Classify a raw vehicle count observed at a junction.
    ///
    /// Roadside counters only distinguish heavy traffic, so a bare count is
    /// never classified as [`CongestionLevel::Medium`].
    ///
    /// # Examples
    ///
    /// ```
    /// use trafficway_core::CongestionLevel;
    ///
    /// assert_eq!(CongestionLevel::from_vehicle_count(2), CongestionLevel::Low);
    /// assert_eq!(CongestionLevel::from_vehicle_count(15), CongestionLevel::Low);
    /// assert_eq!(CongestionLevel::from_vehicle_count(16), CongestionLevel::High);
    /// ```
    #[must_use]
    pub const fn from_vehicle_count(vehicles: u32) -> Self {
        if vehicles > HIGH_DENSITY_VEHICLES {
            Self::High
        } else {
            Self::Low
        }
    }

    /// Title-case label used on the wire and in rationale text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown congestion label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown congestion level {0:?}")]
pub struct ParseCongestionLevelError(pub String);

impl FromStr for CongestionLevel {
    type Err = ParseCongestionLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseCongestionLevelError(s.to_owned())),
        }
    }
}

/// Most recent observation for one junction.
///
/// # Examples
///
/// ```
/// use chrono::{TimeDelta, Utc};
/// use std::time::Duration;
/// use trafficway_core::{CongestionLevel, GeoPoint, JunctionState};
///
/// let observed_at = Utc::now();
/// let state = JunctionState {
///     id: 7,
///     point: GeoPoint { latitude: 51.5, longitude: -0.1 },
///     congestion_level: CongestionLevel::High,
///     vehicle_count: 22,
///     observed_at,
/// };
/// let later = observed_at + TimeDelta::minutes(6);
/// assert!(state.is_stale(later, Duration::from_secs(300)));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JunctionState {
    /// Junction identifier.
    pub id: JunctionId,
    /// Junction position.
    pub point: GeoPoint,
    /// Current congestion classification.
    pub congestion_level: CongestionLevel,
    /// Vehicles counted in the last observation window.
    pub vehicle_count: u32,
    /// When the observation was made.
    pub observed_at: DateTime<Utc>,
}

impl JunctionState {
    /// Time elapsed between the observation and `now`.
    ///
    /// Observations stamped in the future (clock skew between the roadside
    /// worker and this host) have zero age.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.observed_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Whether the observation is older than `window`.
    ///
    /// An entry exactly `window` old is still fresh.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.age(now) > window
    }
}
