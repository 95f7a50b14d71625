//! Fenceline Core
//!
//! Platform-independent boundary proximity engine. This crate holds all the
//! logic that decides how close a tracked position is to a monitored
//! boundary line and when the user should be alerted about it.
//!
//! There is no I/O and no async code here; position samples, clocks and
//! vibration hardware are supplied by the host (see `fenceline-server`).
//!
//! # Modules
//!
//! - [`geo`]: geographic points, the monitored [`Boundary`](geo::Boundary),
//!   distance and side-of-line computations
//! - [`proximity`]: the debounced zone state machine
//! - [`alert`]: the alert sink seam and the monitor that drives it
//!
//! # Example
//!
//! ```rust
//! use fenceline_core::geo::{Boundary, GeoPoint};
//! use fenceline_core::proximity::{ProximityEngine, ProximityZone, Thresholds};
//!
//! let boundary = Boundary::new(GeoPoint::new(10.0, 76.0), GeoPoint::new(10.0, 76.001)).unwrap();
//! let mut engine = ProximityEngine::new(boundary, Thresholds::default()).unwrap();
//!
//! let update = engine.process_sample(GeoPoint::new(10.01, 76.0005), 0).unwrap();
//! assert_eq!(update.zone, ProximityZone::Safe);
//! assert!(!update.alert_fired);
//! ```

pub mod alert;
pub mod geo;
pub mod proximity;

pub use alert::{AlertSink, NullAlertSink, ProximityMonitor};
pub use geo::{Boundary, BoundaryError, GeoPoint, Side};
pub use proximity::{
    ProximityEngine, ProximityError, ProximitySnapshot, ProximityUpdate, ProximityZone,
    Thresholds, Transition,
};
