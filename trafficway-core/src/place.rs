//! Geocoding results.

use crate::GeoPoint;

/// A place returned by a geocoder, before it is ranked for display.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeocodedPlace {
    /// Resolved position.
    pub point: GeoPoint,
    /// Human-readable label supplied by the provider.
    pub display_name: String,
}

/// A suggestion offered for a partially typed place name.
///
/// Candidates only live for the query that produced them; identifiers are
/// 1-based positions in the delivered list and carry no meaning across
/// queries.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaceCandidate {
    /// Position of the candidate in the delivered list.
    pub id: u32,
    /// Resolved position.
    pub point: GeoPoint,
    /// Human-readable label.
    pub display_name: String,
}
