//! The monitored boundary segment.
//!
//! Defines the directed boundary line, point-to-segment distance and the
//! cross product side test.

use serde::{de, Deserialize, Deserializer, Serialize};

use super::point::{distance_meters, GeoPoint};

/// Errors constructing a [`Boundary`]
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum BoundaryError {
    /// Start point has a NaN or infinite coordinate
    #[error("boundary start point {0} is not finite")]
    NonFiniteStart(GeoPoint),
    /// End point has a NaN or infinite coordinate
    #[error("boundary end point {0} is not finite")]
    NonFiniteEnd(GeoPoint),
}

/// Which half-plane of the directed boundary a point lies in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Cross product is positive
    Safe,
    /// Exactly on the line through start and end
    Colinear,
    /// Cross product is strictly negative; the side alerts are raised for
    Unsafe,
}

impl Side {
    /// Classify a raw cross product value from [`side_of`]
    pub fn from_cross(value: f64) -> Self {
        if value < 0.0 {
            Side::Unsafe
        } else if value > 0.0 {
            Side::Safe
        } else {
            Side::Colinear
        }
    }

    pub fn is_unsafe(&self) -> bool {
        *self == Side::Unsafe
    }
}

/// A directed two-point boundary segment
///
/// Both endpoints are guaranteed finite. `start == end` is allowed and is
/// handled as a zero-length segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Boundary {
    start: GeoPoint,
    end: GeoPoint,
}

impl<'de> Deserialize<'de> for Boundary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            start: GeoPoint,
            end: GeoPoint,
        }

        let raw = Raw::deserialize(deserializer)?;
        Boundary::new(raw.start, raw.end).map_err(de::Error::custom)
    }
}

impl Boundary {
    /// Create a boundary running from `start` to `end`
    pub fn new(start: GeoPoint, end: GeoPoint) -> Result<Self, BoundaryError> {
        if !start.is_finite() {
            return Err(BoundaryError::NonFiniteStart(start));
        }
        if !end.is_finite() {
            return Err(BoundaryError::NonFiniteEnd(end));
        }
        Ok(Boundary { start, end })
    }

    pub fn start(&self) -> GeoPoint {
        self.start
    }

    pub fn end(&self) -> GeoPoint {
        self.end
    }

    /// The same segment traversed in the opposite direction
    pub fn reversed(&self) -> Boundary {
        Boundary {
            start: self.end,
            end: self.start,
        }
    }

    /// True for a zero-length segment (start == end)
    pub fn is_degenerate(&self) -> bool {
        (self.end.to_plane() - self.start.to_plane()).norm_squared() == 0.0
    }

    /// Great-circle length of the segment in meters
    pub fn length(&self) -> f64 {
        distance_meters(&self.start, &self.end)
    }

    /// Closest point on the segment to `p`, in the flat lat/lon plane
    pub fn closest_point(&self, p: &GeoPoint) -> GeoPoint {
        let start = self.start.to_plane();
        let dir = self.end.to_plane() - start;
        let length_squared = dir.norm_squared();

        if length_squared == 0.0 {
            return self.start;
        }

        let t = ((p.to_plane() - start).dot(&dir) / length_squared).clamp(0.0, 1.0);
        GeoPoint::from_plane(start + dir * t)
    }

    /// Distance in meters from `p` to the closest point of the segment
    pub fn distance_to(&self, p: &GeoPoint) -> f64 {
        distance_to_segment(p, self)
    }

    /// Half-plane classification of `p`
    pub fn side(&self, p: &GeoPoint) -> Side {
        Side::from_cross(side_of(p, self))
    }
}

/// Distance in meters from `p` to the segment `boundary`.
///
/// Projects in the lat/lon plane, clamping to the endpoints, then measures
/// the great-circle distance to the projected point.
pub fn distance_to_segment(p: &GeoPoint, boundary: &Boundary) -> f64 {
    distance_meters(p, &boundary.closest_point(p))
}

/// Signed cross product of (end - start) and (p - start).
///
/// Negative means the unsafe side; zero means colinear with the infinite
/// extension of the segment.
pub fn side_of(p: &GeoPoint, boundary: &Boundary) -> f64 {
    let start = boundary.start.to_plane();
    let rel = p.to_plane() - start;
    let dir = boundary.end.to_plane() - start;

    // rel.x * dir.y - rel.y * dir.x
    rel.perp(&dir)
}
