//! Fenceline Server
//!
//! Native host for the `fenceline-core` proximity engine. Wires a boundary
//! file, a stream of position samples and a haptic actuator to the engine,
//! and optionally serves the current state as JSON.
//!
//! # Subsystems
//!
//! | Name | Role |
//! |------|------|
//! | `positions` | Reads samples, owns the engine, publishes [`positions::StatusReport`] |
//! | `haptics` | Performs queued vibrations |
//! | `http` | Serves `/api/state` and `/api/boundary` (only with `--port`) |

pub mod config;
pub mod haptics;
pub mod positions;
pub mod web;

pub use config::{Cli, ConfigError, Settings};
