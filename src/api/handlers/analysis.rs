use axum::{extract::State, Json};

use super::{service_error, ApiError};
use crate::api::{state::AppState, types::*};
use crate::domain::AnalysisEntry;

/// POST /api/analyze
///
/// Always 200 once the input is valid; odds or prediction failures are
/// reported inside the entry.
pub async fn analyze_match(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> std::result::Result<Json<AnalysisEntry>, ApiError> {
    let entry = state
        .service
        .analyze(&req.home_team, &req.away_team, req.force_refresh)
        .await
        .map_err(service_error)?;
    Ok(Json(entry))
}

/// GET /api/history
pub async fn get_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    let entries = state.service.history().await;
    Json(HistoryResponse {
        total: entries.len(),
        entries,
    })
}
