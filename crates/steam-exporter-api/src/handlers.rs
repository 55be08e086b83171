//! Request handlers.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use steam_metrics::{CONTENT_TYPE, render_prometheus};
use tracing::{debug, error};

use crate::ApiState;

// ── Prometheus ─────────────────────────────────────────────────

/// GET /metrics
///
/// Collection failures are logged by the collector and never change the
/// status code; the scrape gets whatever the registry holds.
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let outcome = state.collector.collect().await;
    debug!(?outcome, "pre-gather collection finished");

    match render_prometheus(state.metrics.registry()) {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to encode metrics: {e}"),
            )
                .into_response()
        }
    }
}
