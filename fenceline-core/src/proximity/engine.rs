//! Proximity Engine
//!
//! Debounced zone state machine. The engine owns its state exclusively;
//! callers observe it through the [`ProximityUpdate`] returned for each
//! sample or through the read-only accessors.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::zone::{ProximityZone, Thresholds};
use crate::geo::{distance_to_segment, side_of, Boundary, GeoPoint, Side};

/// Proximity engine errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProximityError {
    /// A threshold is negative, NaN or infinite
    #[error("invalid {name} threshold: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
    /// A position sample has a NaN or infinite coordinate
    #[error("position sample {0} is not finite")]
    NonFinitePosition(GeoPoint),
}

/// What happened to the zone while processing a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Transition {
    /// Candidate zone equals the current zone
    Unchanged,
    /// The zone changed; `from` is the zone that was left
    Committed { from: ProximityZone },
    /// A different zone was proposed inside the debounce window and dropped
    Debounced { candidate: ProximityZone },
}

/// Result of processing one position sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityUpdate {
    /// Zone after this sample
    pub zone: ProximityZone,
    /// Distance to the boundary in meters
    pub distance: f64,
    /// Side of the boundary the sample lies on
    pub side: Side,
    /// The sample itself
    pub position: GeoPoint,
    /// Outcome of the zone decision
    pub transition: Transition,
    /// True when the caller should trigger the haptic alert
    pub alert_fired: bool,
}

/// Read-only view of the engine state for presentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximitySnapshot {
    pub zone: ProximityZone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<GeoPoint>,
    /// Timestamp of the last committed zone change (milliseconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_change: Option<u64>,
}

/// Mutable engine state
#[derive(Debug, Clone, Default)]
struct EngineState {
    zone: ProximityZone,
    distance: Option<f64>,
    side: Option<Side>,
    position: Option<GeoPoint>,
    last_change: Option<u64>,
}

/// Boundary proximity engine
///
/// Single-writer: feed samples from one logical stream, in order.
/// Timestamps are milliseconds on any monotonic timeline chosen by the
/// caller; the engine never reads a clock.
#[derive(Debug, Clone)]
pub struct ProximityEngine {
    boundary: Boundary,
    thresholds: Thresholds,
    state: EngineState,
}

impl ProximityEngine {
    /// Create an engine for `boundary`. Starts in [`ProximityZone::Initializing`].
    pub fn new(boundary: Boundary, thresholds: Thresholds) -> Result<Self, ProximityError> {
        validate_distance("near", thresholds.near_distance)?;
        validate_distance("red", thresholds.red_distance)?;

        Ok(ProximityEngine {
            boundary,
            thresholds,
            state: EngineState::default(),
        })
    }

    /// Process one position sample taken at `now` (milliseconds).
    ///
    /// A non-finite sample is rejected and leaves the state untouched.
    pub fn process_sample(
        &mut self,
        position: GeoPoint,
        now: u64,
    ) -> Result<ProximityUpdate, ProximityError> {
        if !position.is_finite() {
            return Err(ProximityError::NonFinitePosition(position));
        }

        let distance = distance_to_segment(&position, &self.boundary);
        let side = Side::from_cross(side_of(&position, &self.boundary));
        let candidate = self
            .thresholds
            .classify(distance, side, !self.boundary.is_degenerate());

        let state = &mut self.state;
        state.distance = Some(distance);
        state.side = Some(side);
        state.position = Some(position);

        let transition = if candidate == state.zone {
            Transition::Unchanged
        } else if within_debounce(state.last_change, now, self.thresholds.debounce) {
            Transition::Debounced { candidate }
        } else {
            let from = state.zone;
            state.zone = candidate;
            state.last_change = Some(now);
            Transition::Committed { from }
        };

        let alert_fired =
            matches!(transition, Transition::Committed { .. }) && state.zone.is_alerting();

        Ok(ProximityUpdate {
            zone: state.zone,
            distance,
            side,
            position,
            transition,
            alert_fired,
        })
    }

    pub fn zone(&self) -> ProximityZone {
        self.state.zone
    }

    /// Distance of the last accepted sample, in meters
    pub fn distance(&self) -> Option<f64> {
        self.state.distance
    }

    pub fn last_position(&self) -> Option<GeoPoint> {
        self.state.position
    }

    /// Timestamp of the last committed zone change
    pub fn last_change(&self) -> Option<u64> {
        self.state.last_change
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn snapshot(&self) -> ProximitySnapshot {
        ProximitySnapshot {
            zone: self.state.zone,
            distance: self.state.distance,
            side: self.state.side,
            position: self.state.position,
            last_change: self.state.last_change,
        }
    }
}

fn validate_distance(name: &'static str, value: f64) -> Result<(), ProximityError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ProximityError::InvalidThreshold { name, value })
    }
}

/// True if a change at `now` falls inside the debounce window.
///
/// A timestamp earlier than the last change counts as zero elapsed time.
fn within_debounce(last_change: Option<u64>, now: u64, debounce: Duration) -> bool {
    match last_change {
        Some(last) => Duration::from_millis(now.saturating_sub(last)) <= debounce,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::METERS_PER_DEGREE_LATITUDE;

    const BASE_LAT: f64 = 10.0;
    const MID_LON: f64 = 76.0005;

    /// East-running boundary; south of it is the unsafe side
    fn boundary() -> Boundary {
        Boundary::new(GeoPoint::new(BASE_LAT, 76.0), GeoPoint::new(BASE_LAT, 76.001)).unwrap()
    }

    fn thresholds() -> Thresholds {
        Thresholds {
            near_distance: 50.0,
            red_distance: 10.0,
            debounce: Duration::from_millis(500),
        }
    }

    fn engine() -> ProximityEngine {
        ProximityEngine::new(boundary(), thresholds()).unwrap()
    }

    /// Point `meters` south (unsafe side) of the boundary midpoint
    fn south(meters: f64) -> GeoPoint {
        GeoPoint::new(BASE_LAT - meters / METERS_PER_DEGREE_LATITUDE, MID_LON)
    }

    /// Point `meters` north (safe side) of the boundary midpoint
    fn north(meters: f64) -> GeoPoint {
        GeoPoint::new(BASE_LAT + meters / METERS_PER_DEGREE_LATITUDE, MID_LON)
    }

    #[test]
    fn test_initial_state() {
        let e = engine();
        assert_eq!(e.zone(), ProximityZone::Initializing);
        assert_eq!(e.distance(), None);
        assert_eq!(e.last_position(), None);
        assert_eq!(e.last_change(), None);
    }

    #[test]
    fn test_invalid_thresholds() {
        let mut t = thresholds();
        t.near_distance = -1.0;
        assert!(matches!(
            ProximityEngine::new(boundary(), t),
            Err(ProximityError::InvalidThreshold { name: "near", .. })
        ));

        let mut t = thresholds();
        t.red_distance = f64::NAN;
        assert!(matches!(
            ProximityEngine::new(boundary(), t),
            Err(ProximityError::InvalidThreshold { name: "red", .. })
        ));
    }

    #[test]
    fn test_midpoint_is_near() {
        let mut e = engine();
        let update = e.process_sample(GeoPoint::new(BASE_LAT, MID_LON), 0).unwrap();

        assert!(update.distance < 1e-6);
        assert_eq!(update.side, Side::Colinear);
        assert_eq!(update.zone, ProximityZone::Near);
        assert!(update.alert_fired);
    }

    #[test]
    fn test_first_sample_far_away_is_safe() {
        let mut e = engine();
        let update = e.process_sample(north(1000.0), 0).unwrap();

        assert_eq!(update.zone, ProximityZone::Safe);
        assert_eq!(
            update.transition,
            Transition::Committed {
                from: ProximityZone::Initializing
            }
        );
        assert!(!update.alert_fired);
        assert!((update.distance - 1000.0).abs() < 0.01);
        assert_eq!(e.last_change(), Some(0));
    }

    #[test]
    fn test_crossed_then_hold_then_safe() {
        let mut e = engine();

        let u = e.process_sample(south(5.0), 0).unwrap();
        assert_eq!(u.zone, ProximityZone::Crossed);
        assert!(u.alert_fired);

        let u = e.process_sample(south(5.0), 200).unwrap();
        assert_eq!(u.zone, ProximityZone::Crossed);
        assert_eq!(u.transition, Transition::Unchanged);
        assert!(!u.alert_fired);

        let u = e.process_sample(north(60.0), 600).unwrap();
        assert_eq!(u.zone, ProximityZone::Safe);
        assert_eq!(
            u.transition,
            Transition::Committed {
                from: ProximityZone::Crossed
            }
        );
        assert!(!u.alert_fired);
        assert_eq!(e.last_change(), Some(600));
    }

    #[test]
    fn test_red_threshold_is_strict() {
        let mut e = engine();
        // Exactly at the red threshold on the safe side
        let u = e.process_sample(north(10.0), 0).unwrap();
        assert_eq!(u.zone, ProximityZone::Near);

        // Just past the red threshold on the unsafe side
        let mut e = engine();
        let u = e.process_sample(south(10.0 + 1e-6), 0).unwrap();
        assert_eq!(u.zone, ProximityZone::Near);
    }

    #[test]
    fn test_close_on_safe_side_is_near() {
        let mut e = engine();
        let u = e.process_sample(north(2.0), 0).unwrap();
        assert_eq!(u.side, Side::Safe);
        assert_eq!(u.zone, ProximityZone::Near);
    }

    #[test]
    fn test_debounce_drops_change() {
        let mut e = engine();

        // Change A accepted
        let u = e.process_sample(north(30.0), 1_000).unwrap();
        assert_eq!(u.zone, ProximityZone::Near);
        assert!(u.alert_fired);

        // Change B inside the window is dropped, but distance still tracks
        let u = e.process_sample(north(200.0), 1_300).unwrap();
        assert_eq!(u.zone, ProximityZone::Near);
        assert_eq!(
            u.transition,
            Transition::Debounced {
                candidate: ProximityZone::Safe
            }
        );
        assert!(!u.alert_fired);
        assert!((e.distance().unwrap() - 200.0).abs() < 0.01);
        assert_eq!(e.last_position(), Some(north(200.0)));
        assert_eq!(e.last_change(), Some(1_000));

        // Exactly at the window edge is still inside
        let u = e.process_sample(north(200.0), 1_500).unwrap();
        assert_eq!(u.zone, ProximityZone::Near);

        // A later proposal outside the window commits
        let u = e.process_sample(north(200.0), 1_501).unwrap();
        assert_eq!(u.zone, ProximityZone::Safe);
        assert_eq!(e.last_change(), Some(1_501));
    }

    #[test]
    fn test_debounced_alert_is_not_fired_later() {
        let mut e = engine();
        e.process_sample(north(200.0), 0).unwrap();

        // Into Near inside the window: dropped, no alert
        let u = e.process_sample(north(30.0), 100).unwrap();
        assert_eq!(u.zone, ProximityZone::Safe);
        assert!(!u.alert_fired);

        // Still near after the window: committed now, alert once
        let u = e.process_sample(north(30.0), 700).unwrap();
        assert_eq!(u.zone, ProximityZone::Near);
        assert!(u.alert_fired);

        let u = e.process_sample(north(30.0), 1_400).unwrap();
        assert!(!u.alert_fired);
    }

    #[test]
    fn test_near_to_crossed_alerts_again() {
        let mut e = engine();
        let u = e.process_sample(south(30.0), 0).unwrap();
        assert_eq!(u.zone, ProximityZone::Near);
        assert!(u.alert_fired);

        let u = e.process_sample(south(3.0), 1_000).unwrap();
        assert_eq!(u.zone, ProximityZone::Crossed);
        assert!(u.alert_fired);

        // Leaving Crossed for Near is still a transition into Near
        let u = e.process_sample(south(30.0), 2_000).unwrap();
        assert_eq!(u.zone, ProximityZone::Near);
        assert!(u.alert_fired);

        let u = e.process_sample(north(500.0), 3_000).unwrap();
        assert_eq!(u.zone, ProximityZone::Safe);
        assert!(!u.alert_fired);
    }

    #[test]
    fn test_one_alert_per_commit() {
        let mut e = engine();
        let mut alerts = 0;
        let mut now = 0;
        for _ in 0..10 {
            if e.process_sample(south(5.0), now).unwrap().alert_fired {
                alerts += 1;
            }
            now += 1_000;
        }
        assert_eq!(alerts, 1);
    }

    #[test]
    fn test_oscillation_sticks_on_stale_zone() {
        let mut e = engine();
        e.process_sample(north(49.0), 0).unwrap();
        assert_eq!(e.zone(), ProximityZone::Near);

        // Flicker across the near threshold faster than the debounce
        for (i, meters) in [51.0, 49.0, 51.0, 49.0, 51.0].iter().enumerate() {
            let u = e.process_sample(north(*meters), 100 * (i as u64 + 1)).unwrap();
            assert_eq!(u.zone, ProximityZone::Near);
            assert!(!u.alert_fired);
        }
    }

    #[test]
    fn test_non_monotonic_time_is_debounced() {
        let mut e = engine();
        e.process_sample(north(30.0), 10_000).unwrap();
        let u = e.process_sample(north(200.0), 5_000).unwrap();
        assert_eq!(u.zone, ProximityZone::Near);
        assert!(matches!(u.transition, Transition::Debounced { .. }));
    }

    #[test]
    fn test_non_finite_sample_keeps_state() {
        let mut e = engine();
        e.process_sample(south(5.0), 0).unwrap();
        let before = e.snapshot();

        let err = e
            .process_sample(GeoPoint::new(f64::NAN, MID_LON), 1_000)
            .unwrap_err();
        assert!(matches!(err, ProximityError::NonFinitePosition(_)));

        let err = e
            .process_sample(GeoPoint::new(BASE_LAT, f64::INFINITY), 2_000)
            .unwrap_err();
        assert!(matches!(err, ProximityError::NonFinitePosition(_)));

        assert_eq!(e.snapshot(), before);
        assert_eq!(e.zone(), ProximityZone::Crossed);
    }

    #[test]
    fn test_non_finite_first_sample_stays_initializing() {
        let mut e = engine();
        assert!(e.process_sample(GeoPoint::new(f64::NAN, f64::NAN), 0).is_err());
        assert_eq!(e.zone(), ProximityZone::Initializing);
        assert_eq!(e.distance(), None);
    }

    #[test]
    fn test_degenerate_boundary_never_crossed() {
        let point = GeoPoint::new(BASE_LAT, MID_LON);
        let b = Boundary::new(point, point).unwrap();
        let mut e = ProximityEngine::new(b, thresholds()).unwrap();

        let mut now = 0;
        for p in [
            point,
            south(1.0),
            GeoPoint::new(BASE_LAT, MID_LON - 0.00001),
            GeoPoint::new(BASE_LAT - 0.00001, MID_LON + 0.00001),
        ] {
            let u = e.process_sample(p, now).unwrap();
            assert_ne!(u.zone, ProximityZone::Crossed);
            assert_eq!(u.zone, ProximityZone::Near);
            assert!((u.distance - p.distance_to(&point)).abs() < 1e-9);
            now += 1_000;
        }
    }

    #[test]
    fn test_zero_debounce_commits_every_change() {
        let mut t = thresholds();
        t.debounce = Duration::ZERO;
        let mut e = ProximityEngine::new(boundary(), t).unwrap();

        e.process_sample(north(200.0), 0).unwrap();
        let u = e.process_sample(north(30.0), 1).unwrap();
        assert_eq!(u.zone, ProximityZone::Near);
        assert!(u.alert_fired);
    }

    #[test]
    fn test_snapshot() {
        let mut e = engine();
        let snap = e.snapshot();
        assert_eq!(snap.zone, ProximityZone::Initializing);
        assert!(snap.position.is_none());

        let json = serde_json::to_value(snap).unwrap();
        assert_eq!(json["zone"], "initializing");
        assert!(json.get("distance").is_none());

        e.process_sample(south(5.0), 42).unwrap();
        let json = serde_json::to_value(e.snapshot()).unwrap();
        assert_eq!(json["zone"], "crossed");
        assert_eq!(json["side"], "unsafe");
        assert_eq!(json["lastChange"], 42);
    }
}
