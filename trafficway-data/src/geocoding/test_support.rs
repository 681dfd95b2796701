//! Test utilities for geocoders.

use async_trait::async_trait;
use trafficway_core::{GeocodeError, GeocodedPlace, Geocoder};

/// Stub `Geocoder` returning places whose label contains the query.
///
/// Matching is case-insensitive, so a stub loaded with a small gazetteer
/// behaves like a very small search index.
#[derive(Debug, Clone, Default)]
pub struct StubGeocoder {
    places: Vec<GeocodedPlace>,
    error: Option<GeocodeError>,
}

impl StubGeocoder {
    /// Create a geocoder searching `places`.
    #[must_use]
    pub fn with_places(places: Vec<GeocodedPlace>) -> Self {
        Self {
            places,
            error: None,
        }
    }

    /// Create a geocoder failing every query with `error`.
    #[must_use]
    pub fn with_error(error: GeocodeError) -> Self {
        Self {
            places: Vec::new(),
            error: Some(error),
        }
    }
}

#[async_trait(?Send)]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodedPlace>, GeocodeError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        let needle = query.to_lowercase();
        Ok(self
            .places
            .iter()
            .filter(|place| place.display_name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use trafficway_core::GeoPoint;

    fn place(name: &str) -> GeocodedPlace {
        GeocodedPlace {
            point: GeoPoint {
                latitude: 51.5,
                longitude: -0.1,
            },
            display_name: name.to_owned(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn matches_labels_case_insensitively() {
        let geocoder = StubGeocoder::with_places(vec![
            place("Waterloo Station"),
            place("Waterloo Bridge"),
            place("Victoria Station"),
        ]);

        let places = geocoder.geocode("waterloo").await.expect("should succeed");

        let names: Vec<&str> = places.iter().map(|p| p.display_name.as_str()).collect();
        assert_eq!(names, vec!["Waterloo Station", "Waterloo Bridge"]);
    }
}
