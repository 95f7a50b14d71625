//! Geographic points and great-circle distance.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters (IUGG)
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Length of one degree of latitude in meters on the mean sphere
pub const METERS_PER_DEGREE_LATITUDE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// A geographic position in signed decimal degrees
///
/// Values outside the usual latitude/longitude ranges are accepted; only
/// finiteness is checked, and only where a point enters the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    /// Latitude in degrees, positive north
    pub latitude: f64,
    /// Longitude in degrees, positive east
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    /// True when both coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Great-circle distance to another point in meters
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_meters(self, other)
    }

    /// Position in the local plane used for segment projection.
    ///
    /// Latitude is x, longitude is y. Both the projection and the side test
    /// must go through this function so they agree on axis order.
    pub(crate) fn to_plane(self) -> Vector2<f64> {
        Vector2::new(self.latitude, self.longitude)
    }

    pub(crate) fn from_plane(v: Vector2<f64>) -> Self {
        GeoPoint::new(v.x, v.y)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Haversine distance between two points in meters.
///
/// Symmetric, never negative, and zero for identical points.
pub fn distance_meters(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let dlat = (p2.latitude - p1.latitude).to_radians();
    let dlon = (p2.longitude - p1.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    // Rounding can push h a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_M * h.clamp(0.0, 1.0).sqrt().asin()
}
