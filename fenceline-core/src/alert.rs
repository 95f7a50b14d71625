//! Haptic Alert Wiring
//!
//! The engine only decides *whether* to alert. An [`AlertSink`] performs the
//! alert, and a [`ProximityMonitor`] glues the two together.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use fenceline_core::alert::{AlertSink, ProximityMonitor};
//! use fenceline_core::geo::{Boundary, GeoPoint};
//! use fenceline_core::proximity::{ProximityEngine, Thresholds};
//!
//! #[derive(Default)]
//! struct Recorder(Vec<Duration>);
//!
//! impl AlertSink for Recorder {
//!     fn vibrate(&mut self, duration: Duration) {
//!         self.0.push(duration);
//!     }
//! }
//!
//! let boundary = Boundary::new(GeoPoint::new(10.0, 76.0), GeoPoint::new(10.0, 76.001)).unwrap();
//! let engine = ProximityEngine::new(boundary, Thresholds::default()).unwrap();
//! let mut monitor = ProximityMonitor::new(engine, Recorder::default(), Duration::from_millis(800));
//!
//! monitor.on_sample(GeoPoint::new(10.0, 76.0005), 0).unwrap();
//! assert_eq!(monitor.sink().0, vec![Duration::from_millis(800)]);
//! ```

use std::time::Duration;

use crate::geo::GeoPoint;
use crate::proximity::{ProximityEngine, ProximityError, ProximityUpdate};

/// Default vibration length for an alert
pub const DEFAULT_ALERT_DURATION: Duration = Duration::from_millis(1000);

/// Receiver of "vibrate for a duration" commands
///
/// Implementations must return promptly: the call is fire-and-forget and
/// happens on the sample processing path.
pub trait AlertSink {
    fn vibrate(&mut self, duration: Duration);
}

impl<S: AlertSink + ?Sized> AlertSink for Box<S> {
    fn vibrate(&mut self, duration: Duration) {
        (**self).vibrate(duration)
    }
}

/// Sink that drops every alert
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAlertSink;

impl AlertSink for NullAlertSink {
    fn vibrate(&mut self, _duration: Duration) {}
}

/// Engine plus alert sink
#[derive(Debug)]
pub struct ProximityMonitor<S: AlertSink> {
    engine: ProximityEngine,
    sink: S,
    alert_duration: Duration,
}

impl<S: AlertSink> ProximityMonitor<S> {
    pub fn new(engine: ProximityEngine, sink: S, alert_duration: Duration) -> Self {
        ProximityMonitor {
            engine,
            sink,
            alert_duration,
        }
    }

    /// Run one sample through the engine, vibrating if it asks for an alert
    pub fn on_sample(
        &mut self,
        position: GeoPoint,
        now: u64,
    ) -> Result<ProximityUpdate, ProximityError> {
        let update = self.engine.process_sample(position, now)?;
        if update.alert_fired {
            self.sink.vibrate(self.alert_duration);
        }
        Ok(update)
    }

    pub fn engine(&self) -> &ProximityEngine {
        &self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn alert_duration(&self) -> Duration {
        self.alert_duration
    }
}
