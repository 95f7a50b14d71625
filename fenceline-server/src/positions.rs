//! Position Feed
//!
//! Reads position samples as JSON lines and drives the proximity monitor.
//! This subsystem is the single writer of the engine state; everything else
//! sees it through the [`StatusReport`] published on a watch channel.
//!
//! Sample format, one per line:
//!
//! ```text
//! {"latitude": 10.0001, "longitude": 76.0005, "timestamp": 1718000000123}
//! ```
//!
//! `timestamp` is in milliseconds and optional. An unstamped sample is
//! placed after the previous sample by the wall time between their arrival,
//! so stamped and unstamped lines share one timeline. Times never go
//! backwards: a stamp earlier than the previous sample is raised to it.
//! Blank lines and lines starting with `#` are ignored.

use std::future::Future;
use std::io;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio_graceful_shutdown::SubsystemHandle;

use fenceline_core::alert::{AlertSink, ProximityMonitor};
use fenceline_core::geo::GeoPoint;
use fenceline_core::proximity::{ProximitySnapshot, ProximityUpdate, Transition};

use crate::config::InputSource;

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("malformed position sample: {0}")]
    Json(#[from] serde_json::Error),
}

/// One line of the position stream
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl PositionSample {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Parse a single input line. Returns `Ok(None)` for blank and comment lines.
pub fn parse_sample(line: &str) -> Result<Option<PositionSample>, SampleError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

/// What the feed publishes after every sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    #[serde(flatten)]
    pub snapshot: ProximitySnapshot,
    /// Samples accepted by the engine
    pub samples: u64,
    /// Lines that could not be parsed or were rejected by the engine
    pub rejected: u64,
    /// Alerts raised so far
    pub alerts: u64,
}

impl StatusReport {
    pub fn new(snapshot: ProximitySnapshot) -> Self {
        StatusReport {
            snapshot,
            samples: 0,
            rejected: 0,
            alerts: 0,
        }
    }
}

/// Keeps sample times on one non-decreasing millisecond timeline
#[derive(Debug)]
struct FeedClock {
    started: Instant,
    /// Time given to the previous sample and when it arrived
    last: Option<(u64, Instant)>,
}

impl FeedClock {
    fn new() -> Self {
        FeedClock {
            started: Instant::now(),
            last: None,
        }
    }

    fn stamp(&mut self, timestamp: Option<u64>, arrived: Instant) -> u64 {
        let now = match (timestamp, self.last) {
            (Some(t), Some((last, _))) => {
                if t < last {
                    log::debug!("Timestamp {} earlier than previous sample at {}", t, last);
                }
                t.max(last)
            }
            (Some(t), None) => t,
            (None, Some((last, at))) => {
                last.saturating_add(arrived.saturating_duration_since(at).as_millis() as u64)
            }
            (None, None) => arrived.saturating_duration_since(self.started).as_millis() as u64,
        };
        self.last = Some((now, arrived));
        now
    }
}

pub struct PositionFeed<S: AlertSink> {
    monitor: ProximityMonitor<S>,
    input: InputSource,
    status: watch::Sender<StatusReport>,
    report: StatusReport,
    clock: FeedClock,
    /// Request shutdown when the input ends
    stop_at_end: bool,
}

impl<S: AlertSink + Send + 'static> PositionFeed<S> {
    pub fn new(
        monitor: ProximityMonitor<S>,
        input: InputSource,
        status: watch::Sender<StatusReport>,
        stop_at_end: bool,
    ) -> Self {
        let report = StatusReport::new(monitor.engine().snapshot());
        PositionFeed {
            monitor,
            input,
            status,
            report,
            clock: FeedClock::new(),
            stop_at_end,
        }
    }

    pub async fn run(mut self, subsys: SubsystemHandle) -> Result<(), io::Error> {
        match self.input.clone() {
            InputSource::Stdin => {
                log::info!("Reading positions from stdin");
                let reader = BufReader::new(tokio::io::stdin());
                self.process_stream(reader, subsys.on_shutdown_requested())
                    .await?;
            }
            InputSource::File(path) => {
                log::info!("Reading positions from {}", path.display());
                let file = tokio::fs::File::open(&path).await?;
                self.process_stream(BufReader::new(file), subsys.on_shutdown_requested())
                    .await?;
            }
        }

        if self.stop_at_end && !subsys.is_shutdown_requested() {
            subsys.request_shutdown();
        }
        Ok(())
    }

    /// Consume lines until the reader ends or `shutdown` completes
    pub async fn process_stream<R, F>(&mut self, reader: R, shutdown: F) -> Result<(), io::Error>
    where
        R: AsyncBufRead + Unpin,
        F: Future<Output = ()>,
    {
        let mut lines = reader.lines();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::debug!("Position feed stopping");
                    break;
                }
                line = lines.next_line() => match line? {
                    Some(line) => self.handle_line(&line),
                    None => {
                        log::info!(
                            "Position stream ended after {} samples ({} rejected)",
                            self.report.samples,
                            self.report.rejected
                        );
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Process one input line and publish the new status
    pub fn handle_line(&mut self, line: &str) {
        self.handle_line_at(line, Instant::now());
    }

    /// Process a line that arrived at `arrived`
    pub fn handle_line_at(&mut self, line: &str, arrived: Instant) {
        let sample = match parse_sample(line) {
            Ok(Some(sample)) => sample,
            Ok(None) => return,
            Err(e) => {
                log::warn!("{}", e);
                self.report.rejected += 1;
                self.publish();
                return;
            }
        };

        let now = self.clock.stamp(sample.timestamp, arrived);

        match self.monitor.on_sample(sample.position(), now) {
            Ok(update) => {
                log_update(&update, now);
                self.report.samples += 1;
                if update.alert_fired {
                    self.report.alerts += 1;
                }
            }
            Err(e) => {
                log::warn!("Sample rejected: {}", e);
                self.report.rejected += 1;
            }
        }
        self.publish();
    }

    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    fn publish(&mut self) {
        self.report.snapshot = self.monitor.engine().snapshot();
        self.status.send_replace(self.report.clone());
    }
}

fn log_update(update: &ProximityUpdate, now: u64) {
    match update.transition {
        Transition::Committed { from } => log::info!(
            "{}: zone {} -> {} at {:.1} m ({:?} side)",
            now,
            from,
            update.zone,
            update.distance,
            update.side
        ),
        Transition::Debounced { candidate } => log::debug!(
            "{}: zone change {} -> {} suppressed by debounce at {:.1} m",
            now,
            update.zone,
            candidate,
            update.distance
        ),
        Transition::Unchanged => log::trace!(
            "{}: {} {} at {:.1} m",
            now,
            update.position,
            update.zone,
            update.distance
        ),
    }
}
