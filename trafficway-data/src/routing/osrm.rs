//! OSRM API response types for the Route service.
//!
//! The Route service returns the fastest route between the supplied
//! coordinates plus, when `alternatives=true`, up to two alternatives. With
//! `geometries=geojson` each geometry is a GeoJSON `LineString` whose
//! coordinates are `[longitude, latitude]` pairs.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// Status code OSRM uses when no route connects the coordinates.
pub const NO_ROUTE: &str = "NoRoute";

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route found
    /// - `"InvalidQuery"` - Invalid query parameters
    /// - `"InvalidOptions"` - Invalid option combination
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Routes in the service's preference order.
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

/// One route of a [`RouteResponse`].
#[derive(Debug, Deserialize)]
pub struct Route {
    /// Length in metres.
    pub distance: f64,
    /// Expected travel time in seconds.
    pub duration: f64,
    /// Full-resolution route geometry.
    pub geometry: LineString,
}

/// GeoJSON `LineString` geometry.
#[derive(Debug, Deserialize)]
pub struct LineString {
    /// `[longitude, latitude]` pairs.
    pub coordinates: Vec<[f64; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_success_response() {
        let json = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 3400.2,
                "duration": 600.5,
                "weight": 600.5,
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-0.1, 51.5], [-0.08, 51.5], [-0.08, 51.51]]
                }
            }],
            "waypoints": []
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(response.is_ok());
        assert!(response.message.is_none());
        let route = response.routes.first().expect("one route");
        assert_eq!(route.geometry.coordinates.len(), 3);
        assert_eq!(route.geometry.coordinates.first(), Some(&[-0.1, 51.5]));
        assert!((route.duration - 600.5).abs() < f64::EPSILON);
    }

    #[test]
    fn deserialise_no_route_response() {
        let json = r#"{
            "code": "NoRoute",
            "message": "Impossible route between points"
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(!response.is_ok());
        assert_eq!(response.code, NO_ROUTE);
        assert!(response.routes.is_empty());
    }
}
