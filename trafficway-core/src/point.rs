//! Geographic positions.
//!
//! [`GeoPoint`] is the immutable latitude/longitude pair passed between every
//! component. It converts to and from [`geo::Coord`], which stores longitude
//! in `x` and latitude in `y`.

use std::fmt;
use std::str::FromStr;

use geo::Coord;
use thiserror::Error;

/// A WGS84 position in decimal degrees.
///
/// # Examples
///
/// ```
/// use trafficway_core::GeoPoint;
///
/// # fn main() -> Result<(), trafficway_core::GeoPointError> {
/// let point = GeoPoint::new(51.5, -0.1)?;
/// assert_eq!(point.latitude, 51.5);
/// assert_eq!(point.longitude, -0.1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

/// Errors returned by [`GeoPoint::new`] and [`GeoPoint::from_str`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoPointError {
    /// A component was NaN or infinite.
    #[error("coordinates must be finite")]
    NonFinite,
    /// Latitude fell outside `-90.0..=90.0`.
    #[error("latitude {0} is outside -90..=90")]
    LatitudeOutOfRange(f64),
    /// Longitude fell outside `-180.0..=180.0`.
    #[error("longitude {0} is outside -180..=180")]
    LongitudeOutOfRange(f64),
    /// The text was not a `lat,lon` pair.
    #[error("expected `lat,lon`, got {0:?}")]
    Malformed(String),
}

impl GeoPoint {
    /// Validates and constructs a [`GeoPoint`].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoPointError> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate()?;
        Ok(point)
    }

    /// Check that both components are finite and in range.
    ///
    /// Points built with a struct literal bypass [`GeoPoint::new`]; callers
    /// receiving such points from outside use this before issuing requests.
    pub fn validate(&self) -> Result<(), GeoPointError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(GeoPointError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(GeoPointError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(GeoPointError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        Self {
            x: point.longitude,
            y: point.latitude,
        }
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(coord: Coord<f64>) -> Self {
        Self {
            latitude: coord.y,
            longitude: coord.x,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

impl FromStr for GeoPoint {
    type Err = GeoPointError;

    /// Parse a `lat,lon` pair such as `51.5,-0.1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || GeoPointError::Malformed(s.to_owned());
        let (lat, lon) = s.split_once(',').ok_or_else(malformed)?;
        let latitude = lat.trim().parse::<f64>().map_err(|_| malformed())?;
        let longitude = lon.trim().parse::<f64>().map_err(|_| malformed())?;
        Self::new(latitude, longitude)
    }
}
