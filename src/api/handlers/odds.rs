use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use super::{api_error, fetch_status, ApiError};
use crate::api::{state::AppState, types::*};

/// GET /api/snapshot
///
/// Whatever is in the cache file, however old.
pub async fn get_snapshot(State(state): State<AppState>) -> Json<SnapshotResponse> {
    let snapshot = state.service.cached_snapshot().await;
    let age_secs = snapshot
        .as_ref()
        .map(|s| s.age(Utc::now()).num_seconds());
    Json(SnapshotResponse { snapshot, age_secs })
}

/// POST /api/refresh?force=true
pub async fn refresh_odds(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> std::result::Result<Json<RefreshResponse>, ApiError> {
    let outcome = state
        .service
        .refresh_odds(query.force)
        .await
        .map_err(|e| api_error(fetch_status(&e), e.to_string()))?;

    Ok(Json(RefreshResponse {
        origin: outcome.origin,
        snapshot: outcome.snapshot,
    }))
}
