use axum::{extract::State, Json};

use crate::api::{state::AppState, types::*};

/// GET /health -- lightweight liveness probe
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = if state.service.cached_snapshot().await.is_some() {
        "ready"
    } else {
        "empty"
    };
    let predictor_configured = state.service.predictor_configured();

    Json(HealthResponse {
        status: if predictor_configured { "ok" } else { "degraded" }.to_string(),
        cache: cache.to_string(),
        predictor_configured,
        uptime_secs: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
