//! Proximity zones and threshold classification.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geo::Side;

/// Default distance in meters at or below which a position is Near
pub const DEFAULT_NEAR_DISTANCE: f64 = 50.0;

/// Default distance in meters below which an unsafe-side position is Crossed
pub const DEFAULT_RED_DISTANCE: f64 = 10.0;

/// Default minimum time between two committed zone changes
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Discrete proximity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProximityZone {
    /// No position sample has been processed yet
    Initializing,
    /// Further than the near threshold
    Safe,
    /// Within the near threshold, or very close on the safe side
    Near,
    /// Within the red threshold on the unsafe side
    Crossed,
}

impl Default for ProximityZone {
    fn default() -> Self {
        ProximityZone::Initializing
    }
}

impl ProximityZone {
    /// True for zones whose entry triggers an alert
    pub fn is_alerting(&self) -> bool {
        matches!(self, ProximityZone::Near | ProximityZone::Crossed)
    }
}

impl std::fmt::Display for ProximityZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProximityZone::Initializing => "initializing",
            ProximityZone::Safe => "safe",
            ProximityZone::Near => "near",
            ProximityZone::Crossed => "crossed",
        };
        write!(f, "{}", s)
    }
}

/// Distance thresholds and debounce interval, fixed for an engine's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    /// Near band in meters (inclusive)
    pub near_distance: f64,
    /// Crossed band in meters (exclusive)
    pub red_distance: f64,
    /// Minimum elapsed time between committed zone changes
    pub debounce: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            near_distance: DEFAULT_NEAR_DISTANCE,
            red_distance: DEFAULT_RED_DISTANCE,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl Thresholds {
    /// Map a distance and side to a candidate zone.
    ///
    /// `can_cross` is false for a zero-length boundary, which has no
    /// meaningful unsafe side.
    pub fn classify(&self, distance: f64, side: Side, can_cross: bool) -> ProximityZone {
        if can_cross && distance < self.red_distance && side.is_unsafe() {
            ProximityZone::Crossed
        } else if distance <= self.near_distance {
            ProximityZone::Near
        } else {
            ProximityZone::Safe
        }
    }
}
