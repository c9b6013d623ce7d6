use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Dashboard (form posts redirect back to /)
        .route("/", get(handlers::dashboard))
        .route("/analyze", post(handlers::submit_analysis))
        .route("/refresh", post(handlers::submit_refresh))
        // Odds endpoints
        .route("/api/snapshot", get(handlers::get_snapshot))
        .route("/api/refresh", post(handlers::refresh_odds))
        // Analysis endpoints
        .route("/api/analyze", post(handlers::analyze_match))
        .route("/api/history", get(handlers::get_history))
        // System endpoints
        .route("/health", get(handlers::health_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
