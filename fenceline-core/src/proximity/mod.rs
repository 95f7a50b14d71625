//! Boundary Proximity Engine
//!
//! This module turns a stream of position samples into a discrete
//! proximity zone and decides when an alert should fire.
//!
//! # Zones
//!
//! | Zone | Condition |
//! |------|-----------|
//! | Initializing | No sample processed yet |
//! | Crossed | distance < red threshold and strictly on the unsafe side |
//! | Near | distance <= near threshold (and not Crossed) |
//! | Safe | everything else |
//!
//! A candidate zone change is committed only when more than the debounce
//! interval has passed since the previous committed change. Changes inside
//! the window are dropped, not delayed. Alerts fire on committed changes
//! into Near or Crossed.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use fenceline_core::geo::{Boundary, GeoPoint};
//! use fenceline_core::proximity::{ProximityEngine, ProximityZone, Thresholds};
//!
//! let boundary = Boundary::new(GeoPoint::new(10.0, 76.0), GeoPoint::new(10.0, 76.001)).unwrap();
//! let thresholds = Thresholds {
//!     near_distance: 50.0,
//!     red_distance: 10.0,
//!     debounce: Duration::from_millis(500),
//! };
//! let mut engine = ProximityEngine::new(boundary, thresholds).unwrap();
//!
//! // On the line itself: colinear, so Near rather than Crossed
//! let update = engine.process_sample(GeoPoint::new(10.0, 76.0005), 1_000).unwrap();
//! assert_eq!(update.zone, ProximityZone::Near);
//! assert!(update.alert_fired);
//! ```

mod engine;
mod zone;

pub use engine::*;
pub use zone::*;
