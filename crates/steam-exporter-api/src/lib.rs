//! steam-exporter-api: HTTP surface of the Steam exporter.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Refresh from the Steam Web API, then Prometheus exposition |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use steam_metrics::{SteamCollector, SteamMetrics};

/// Shared state for handlers.
///
/// The collector writes into the same `SteamMetrics` the handler renders.
#[derive(Clone)]
pub struct ApiState {
    pub collector: Arc<SteamCollector>,
    pub metrics: Arc<SteamMetrics>,
}

impl ApiState {
    pub fn new(collector: Arc<SteamCollector>, metrics: Arc<SteamMetrics>) -> Self {
        Self { collector, metrics }
    }
}

/// Build the exporter router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/metrics", get(handlers::prometheus_metrics))
        .with_state(state)
}
