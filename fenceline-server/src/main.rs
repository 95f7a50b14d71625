use std::time::Duration;

use clap::Parser;
use miette::IntoDiagnostic;
use tokio::sync::watch;
use tokio_graceful_shutdown::{SubsystemBuilder, SubsystemHandle, Toplevel};

use fenceline_core::alert::ProximityMonitor;
use fenceline_core::proximity::ProximityEngine;
use fenceline_server::config::Cli;
use fenceline_server::haptics;
use fenceline_server::positions::{PositionFeed, StatusReport};
use fenceline_server::web::{BoundaryInfo, StatusServer};

#[tokio::main]
async fn main() -> miette::Result<()> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let settings = args.settings().into_diagnostic()?;
    log::info!(
        "Monitoring boundary {} {} -> {} ({:.1} m)",
        settings.boundary_file.name.as_deref().unwrap_or("(unnamed)"),
        settings.boundary.start(),
        settings.boundary.end(),
        settings.boundary.length()
    );
    if settings.boundary.is_degenerate() {
        log::warn!("Boundary start and end coincide; the crossed zone can never be reached");
    }
    log::debug!("Thresholds: {:?}", settings.thresholds);

    let engine = ProximityEngine::new(settings.boundary, settings.thresholds).into_diagnostic()?;

    let (sink, actuator) = haptics::channel(settings.alert_command.clone());
    let monitor = ProximityMonitor::new(engine, sink, settings.alert_duration);
    let (status_tx, status_rx) = watch::channel(StatusReport::new(monitor.engine().snapshot()));

    // Without the HTTP server there is nothing left to do once the input ends
    let feed = PositionFeed::new(
        monitor,
        settings.input.clone(),
        status_tx,
        settings.port.is_none(),
    );
    let web = settings.port.map(|port| {
        let info = BoundaryInfo {
            boundary: settings.boundary_file.clone(),
            length: settings.boundary.length(),
            thresholds: settings.thresholds,
        };
        StatusServer::new(port, status_rx, info)
    });

    Toplevel::new(move |s: SubsystemHandle| async move {
        s.start(SubsystemBuilder::new("haptics", move |h: SubsystemHandle| {
            actuator.run(h)
        }));
        s.start(SubsystemBuilder::new("positions", move |h: SubsystemHandle| {
            feed.run(h)
        }));
        if let Some(web) = web {
            s.start(SubsystemBuilder::new("http", move |h: SubsystemHandle| {
                web.run(h)
            }));
        }
    })
    .catch_signals()
    .handle_shutdown_requests(Duration::from_millis(1000))
    .await
    .map_err(Into::into)
}
