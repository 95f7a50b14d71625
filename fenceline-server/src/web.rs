//! Read-only JSON status API
//!
//! - `GET /api/state`: latest [`StatusReport`]
//! - `GET /api/boundary`: the monitored boundary and thresholds

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_graceful_shutdown::SubsystemHandle;

use fenceline_core::proximity::Thresholds;

use crate::config::BoundaryFile;
use crate::positions::StatusReport;

/// Static description of what is being monitored
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryInfo {
    #[serde(flatten)]
    pub boundary: BoundaryFile,
    /// Segment length in meters
    pub length: f64,
    pub thresholds: Thresholds,
}

#[derive(Clone)]
struct AppState {
    status: watch::Receiver<StatusReport>,
    boundary: Arc<BoundaryInfo>,
}

pub struct StatusServer {
    port: u16,
    status: watch::Receiver<StatusReport>,
    boundary: BoundaryInfo,
}

impl StatusServer {
    pub fn new(port: u16, status: watch::Receiver<StatusReport>, boundary: BoundaryInfo) -> Self {
        StatusServer {
            port,
            status,
            boundary,
        }
    }

    pub async fn run(self, subsys: SubsystemHandle) -> Result<(), io::Error> {
        let app = router(self.status, self.boundary);

        let listener =
            TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))).await?;
        log::info!("Status API listening on http://{}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { subsys.on_shutdown_requested().await })
            .await
    }
}

fn router(status: watch::Receiver<StatusReport>, boundary: BoundaryInfo) -> Router {
    let state = AppState {
        status,
        boundary: Arc::new(boundary),
    };

    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/boundary", get(get_boundary))
        .with_state(state)
}

async fn get_state(State(state): State<AppState>) -> Json<StatusReport> {
    let report = state.status.borrow().clone();
    Json(report)
}

async fn get_boundary(State(state): State<AppState>) -> Json<BoundaryInfo> {
    Json(state.boundary.as_ref().clone())
}
