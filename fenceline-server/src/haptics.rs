//! Haptic alert actuator.
//!
//! [`HapticSink`] is the [`AlertSink`] handed to the proximity monitor. It
//! only queues the request, so the position feed never waits on the
//! actuator. [`HapticActuator`] runs as its own subsystem and performs the
//! queued vibrations.

use std::io;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_graceful_shutdown::SubsystemHandle;

use fenceline_core::alert::AlertSink;

/// Create a connected sink/actuator pair
pub fn channel(command: Option<String>) -> (HapticSink, HapticActuator) {
    let (tx, rx) = mpsc::unbounded_channel();
    (HapticSink { tx }, HapticActuator { rx, command })
}

#[derive(Debug, Clone)]
pub struct HapticSink {
    tx: mpsc::UnboundedSender<Duration>,
}

impl AlertSink for HapticSink {
    fn vibrate(&mut self, duration: Duration) {
        if self.tx.send(duration).is_err() {
            log::warn!(
                "Haptic actuator not running, dropped {} ms alert",
                duration.as_millis()
            );
        }
    }
}

#[derive(Debug)]
pub struct HapticActuator {
    rx: mpsc::UnboundedReceiver<Duration>,
    command: Option<String>,
}

impl HapticActuator {
    pub async fn run(mut self, subsys: SubsystemHandle) -> Result<(), io::Error> {
        loop {
            tokio::select! {
                _ = subsys.on_shutdown_requested() => {
                    log::debug!("Haptic actuator stopping");
                    break;
                }
                request = self.rx.recv() => match request {
                    Some(duration) => self.actuate(duration),
                    None => break,
                }
            }
        }
        Ok(())
    }

    /// Perform one vibration. Failures are logged, never retried.
    pub fn actuate(&self, duration: Duration) {
        let millis = duration.as_millis();
        log::warn!("ALERT: vibrate for {} ms", millis);

        let Some(program) = &self.command else {
            return;
        };

        // Not awaited; tokio reaps the child in the background
        match Command::new(program)
            .arg(millis.to_string())
            .stdin(Stdio::null())
            .spawn()
        {
            Ok(child) => log::debug!("Started {} (pid {:?})", program, child.id()),
            Err(e) => log::error!("Cannot run alert command {}: {}", program, e),
        }
    }
}
