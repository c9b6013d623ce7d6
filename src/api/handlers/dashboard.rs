use axum::{
    extract::State,
    response::{Html, Redirect},
    Form,
};

use crate::api::{
    page::{self, PageView},
    state::AppState,
    types::*,
};

/// GET /
pub async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let view = PageView {
        form: state.form.read().await.clone(),
        notice: state.take_notice().await,
        snapshot: state.service.cached_snapshot().await,
        latest: state.service.latest().await,
        history: state.service.history().await,
        predictor_configured: state.service.predictor_configured(),
    };
    Html(page::render(&view))
}

/// POST /analyze -- sidebar "Analyze Match" button
pub async fn submit_analysis(
    State(state): State<AppState>,
    Form(form): Form<AnalyzeForm>,
) -> Redirect {
    {
        let mut saved = state.form.write().await;
        saved.home_team = form.home_team.trim().to_string();
        saved.away_team = form.away_team.trim().to_string();
    }

    let force = form.force_refresh.is_some();
    match state
        .service
        .analyze(&form.home_team, &form.away_team, force)
        .await
    {
        Ok(entry) => {
            let notice = match (&entry.odds_error, &entry.prediction_error) {
                (None, None) => Notice::info(format!("Analysis ready for {}", entry.title())),
                (Some(odds), None) => Notice::error(format!("Odds refresh failed: {}", odds)),
                (None, Some(pred)) => Notice::error(format!("Prediction failed: {}", pred)),
                (Some(odds), Some(pred)) => Notice::error(format!(
                    "Odds refresh failed: {}; prediction failed: {}",
                    odds, pred
                )),
            };
            state.set_notice(notice).await;
        }
        Err(e) => state.set_notice(Notice::error(e.to_string())).await,
    }

    Redirect::to("/")
}

/// POST /refresh -- sidebar "Refresh odds" button, always bypasses the cache
pub async fn submit_refresh(State(state): State<AppState>) -> Redirect {
    let notice = match state.service.refresh_odds(true).await {
        Ok(outcome) => Notice::info(format!(
            "Odds refreshed: {} matches",
            outcome.snapshot.matches.len()
        )),
        Err(e) => Notice::error(format!("Failed to fetch data: {}", e)),
    };
    state.set_notice(notice).await;
    Redirect::to("/")
}
