//! Boundary Geometry
//!
//! Pure geometry used by the proximity engine: great-circle distance,
//! point-to-segment distance and the side-of-line test.
//!
//! Segment projection treats latitude/longitude as a local Euclidean plane
//! (latitude is the x axis, longitude the y axis). Monitored boundaries are
//! short, so the error of the flat approximation is small; the final
//! distance to the projected point is still measured on the sphere.
//!
//! # Example
//!
//! ```rust
//! use fenceline_core::geo::{Boundary, GeoPoint, Side};
//!
//! let boundary = Boundary::new(GeoPoint::new(10.0, 76.0), GeoPoint::new(10.0, 76.001)).unwrap();
//!
//! let south = GeoPoint::new(9.9999, 76.0005);
//! assert_eq!(boundary.side(&south), Side::Unsafe);
//! assert!(boundary.distance_to(&south) > 10.0);
//! ```

mod boundary;
mod point;

pub use boundary::*;
pub use point::*;
