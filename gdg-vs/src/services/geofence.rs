//! Geofence validation
//!
//! Great-circle distance between the challenge location and the submitter,
//! computed with the haversine formula. Pure functions, no side effects.
//! (0, 0) is treated as valid numeric input, not a missing-location
//! sentinel; callers that need to distinguish "unknown location" must
//! reject coordinate-less submissions upstream.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default maximum distance between submitter and challenge location
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 1.0;

/// A latitude/longitude pair in float degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Great-circle distance between two points in kilometers
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lng1 = a.longitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let lng2 = b.longitude.to_radians();

    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// True iff the submitter is within `max_distance_km` of the target
pub fn within_radius(target: Coordinates, submitter: Coordinates, max_distance_km: f64) -> bool {
    haversine_km(target, submitter) <= max_distance_km
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTRAL_PARK: Coordinates = Coordinates {
        latitude: 40.7831,
        longitude: -73.9712,
    };

    #[test]
    fn test_identical_points_distance_zero() {
        assert_eq!(haversine_km(CENTRAL_PARK, CENTRAL_PARK), 0.0);
        assert!(within_radius(CENTRAL_PARK, CENTRAL_PARK, 0.0));
        assert!(within_radius(CENTRAL_PARK, CENTRAL_PARK, DEFAULT_MAX_DISTANCE_KM));
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinates {
            latitude: 40.7831,
            longitude: -73.9712,
        };
        let b = Coordinates {
            latitude: 51.5074,
            longitude: -0.1278,
        };
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_longitude_at_equator() {
        let origin = Coordinates {
            latitude: 0.0,
            longitude: 0.0,
        };
        let east = Coordinates {
            latitude: 0.0,
            longitude: 1.0,
        };
        let distance = haversine_km(origin, east);
        assert!((distance - 111.19).abs() < 0.1, "got {distance}");
        assert!(!within_radius(origin, east, DEFAULT_MAX_DISTANCE_KM));
    }

    #[test]
    fn test_antipodal_points() {
        let a = Coordinates {
            latitude: 0.0,
            longitude: 0.0,
        };
        let b = Coordinates {
            latitude: 0.0,
            longitude: 180.0,
        };
        let distance = haversine_km(a, b);
        // Half the Earth's circumference at the equator
        assert!((distance - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1.0);
    }

    #[test]
    fn test_within_radius_boundary() {
        let origin = Coordinates {
            latitude: 0.0,
            longitude: 0.0,
        };
        let near = Coordinates {
            latitude: 0.005,
            longitude: 0.0,
        };
        // ~0.556 km north, inside the default 1.0 km fence
        assert!(within_radius(origin, near, DEFAULT_MAX_DISTANCE_KM));
    }
}
