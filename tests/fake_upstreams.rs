//! Full stack against local stand-ins for Betpawa and Perplexity.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use matchday::{
    config::AppConfig,
    domain::{PredictedOutcome, RiskLevel},
    error::FetchError,
    services::{AnalysisService, SnapshotOrigin},
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering},
    Arc,
};
use tokio::net::TcpListener;

const EVENTS_PAGE: &str = r#"<html><body>
<div class="event-list-group-container">
  <span class="event-time">Sat 14/06 17:30</span>
  <span class="event-competition">England - Premier League</span>
  <span class="event-name-team">Manchester City</span>
  <span class="event-name-team">Liverpool</span>
  <button class="button-odds">2.10</button>
  <button class="button-odds">3.40</button>
  <button class="button-odds">3.25</button>
</div>
<div class="event-list-group-container">
  <span class="event-time">Sun 15/06 16:30</span>
  <span class="event-competition">Spain - LaLiga</span>
  <span class="event-name-team">Real Madrid</span>
  <span class="event-name-team">Barcelona</span>
  <button class="button-odds">2.45</button>
  <button class="button-odds">3.60</button>
  <button class="button-odds">2.70</button>
</div>
</body></html>"#;

const VERDICT: &str = "<think>weigh form against injuries</think>\n\
Predicted outcome: Manchester City win\n\
Confidence: 72%\n\
Risk level: low\n\
Recommended bet: Manchester City to win\n\
City have won four of the last five meetings at home.";

#[derive(Default)]
struct Upstream {
    betpawa_calls: AtomicUsize,
    betpawa_fail: AtomicBool,
    pplx_calls: AtomicUsize,
    /// Non-zero forces this status from the completions endpoint
    pplx_status: AtomicU16,
}

async fn events(State(up): State<Arc<Upstream>>) -> Response {
    up.betpawa_calls.fetch_add(1, Ordering::SeqCst);
    if up.betpawa_fail.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response();
    }
    Html(EVENTS_PAGE).into_response()
}

async fn completions(
    State(up): State<Arc<Upstream>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    up.pplx_calls.fetch_add(1, Ordering::SeqCst);

    let forced = up.pplx_status.load(Ordering::SeqCst);
    if forced != 0 {
        let status = StatusCode::from_u16(forced).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "forced").into_response();
    }
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth != "Bearer test-key" {
        return (StatusCode::UNAUTHORIZED, "bad key").into_response();
    }

    assert_eq!(body["model"], "sonar-reasoning");
    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
    let answer = if prompt.starts_with("Based on the following analysis") {
        VERDICT.to_string()
    } else {
        format!("notes for: {}", prompt.lines().next().unwrap_or_default())
    };

    Json(json!({
        "id": "cmpl-1",
        "model": "sonar-reasoning",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": answer } }]
    }))
    .into_response()
}

async fn spawn_upstream() -> (SocketAddr, Arc<Upstream>) {
    let upstream = Arc::new(Upstream::default());
    let app = Router::new()
        .route("/events", get(events))
        .route("/chat/completions", post(completions))
        .with_state(upstream.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind fake upstream");
    let addr = listener.local_addr().expect("no local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, upstream)
}

fn config(addr: SocketAddr, api_key: &str, tag: &str) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.scraper.base_url = format!("http://{}/events", addr);
    cfg.scraper.timeout_secs = 5;
    cfg.scraper.retry_delay_ms = 10;
    cfg.predictor.base_url = format!("http://{}", addr);
    cfg.predictor.api_key = api_key.to_string();
    cfg.predictor.timeout_secs = 5;
    cfg.cache.path = cache_path(tag);
    cfg
}

fn cache_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "matchday_e2e_{}_{}.json",
        tag,
        Utc::now().timestamp_nanos_opt().unwrap_or(0)
    ))
}

#[tokio::test]
async fn analyze_scrapes_once_and_runs_four_completions() {
    let (addr, upstream) = spawn_upstream().await;
    let cfg = config(addr, "test-key", "full");
    let service = AnalysisService::from_config(&cfg).expect("service");

    let entry = service
        .analyze("Manchester City", "Liverpool", false)
        .await
        .expect("analysis");

    let odds = entry.odds.as_ref().expect("odds for the fixture");
    assert_eq!(odds.competition, "England - Premier League");
    assert_eq!(odds.odds.home.to_string(), "2.10");
    assert!(!entry.odds_stale);

    let prediction = entry.prediction.as_ref().expect("prediction");
    assert_eq!(prediction.outcome, PredictedOutcome::HomeWin);
    assert_eq!(prediction.confidence, Some(72));
    assert_eq!(prediction.risk, RiskLevel::Low);
    assert!(!prediction.rationale.contains("<think>"));
    assert!(prediction.team_stats.starts_with("notes for: Analyze these football teams"));

    assert_eq!(upstream.betpawa_calls.load(Ordering::SeqCst), 1);
    assert_eq!(upstream.pplx_calls.load(Ordering::SeqCst), 4);

    // second run inside the TTL reads the cache file
    service
        .analyze("Real Madrid", "Barcelona", false)
        .await
        .expect("analysis");
    assert_eq!(upstream.betpawa_calls.load(Ordering::SeqCst), 1);
    assert_eq!(upstream.pplx_calls.load(Ordering::SeqCst), 8);
    assert_eq!(service.history().await.len(), 2);

    let _ = tokio::fs::remove_file(&cfg.cache.path).await;
}

#[tokio::test]
async fn missing_key_sends_no_prediction_requests() {
    let (addr, upstream) = spawn_upstream().await;
    let cfg = config(addr, "", "no_key");
    let service = AnalysisService::from_config(&cfg).expect("service");
    assert!(!service.predictor_configured());

    let entry = service
        .analyze("Manchester City", "Liverpool", false)
        .await
        .expect("analysis");

    assert!(entry.odds.is_some());
    assert!(entry.prediction.is_none());
    assert_eq!(
        entry.prediction_error.as_deref(),
        Some("PPLX_API_KEY is not configured")
    );
    assert_eq!(upstream.pplx_calls.load(Ordering::SeqCst), 0);

    let _ = tokio::fs::remove_file(&cfg.cache.path).await;
}

#[tokio::test]
async fn failed_scrape_keeps_previous_snapshot() {
    let (addr, upstream) = spawn_upstream().await;
    let cfg = config(addr, "test-key", "keep_cache");
    let service = AnalysisService::from_config(&cfg).expect("service");

    let first = service.refresh_odds(false).await.expect("first scrape");
    assert_eq!(first.origin, SnapshotOrigin::Scrape);
    let before = tokio::fs::read(&cfg.cache.path).await.expect("cache file");

    upstream.betpawa_fail.store(true, Ordering::SeqCst);
    let err = service.refresh_odds(true).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 503 }));
    // one retry on 5xx
    assert_eq!(upstream.betpawa_calls.load(Ordering::SeqCst), 3);
    assert_eq!(tokio::fs::read(&cfg.cache.path).await.expect("cache file"), before);

    let entry = service
        .analyze("Real Madrid", "Barcelona", true)
        .await
        .expect("analysis");
    assert!(entry.odds_error.as_deref().unwrap_or_default().contains("503"));
    assert!(entry.odds_stale);
    assert_eq!(entry.odds.expect("stale odds").id, "real-madrid-vs-barcelona");
    assert!(entry.prediction.is_some());

    let _ = tokio::fs::remove_file(&cfg.cache.path).await;
}

#[tokio::test]
async fn rate_limit_is_reported_on_the_entry() {
    let (addr, upstream) = spawn_upstream().await;
    let cfg = config(addr, "test-key", "rate_limit");
    let service = AnalysisService::from_config(&cfg).expect("service");
    upstream.pplx_status.store(429, Ordering::SeqCst);

    let entry = service
        .analyze("Manchester City", "Liverpool", false)
        .await
        .expect("analysis");
    assert!(entry.odds.is_some());
    assert_eq!(
        entry.prediction_error.as_deref(),
        Some("Prediction service rate limited the request")
    );

    let _ = tokio::fs::remove_file(&cfg.cache.path).await;
}

#[tokio::test]
async fn wrong_key_is_an_auth_error() {
    let (addr, _upstream) = spawn_upstream().await;
    let cfg = config(addr, "stale-key", "auth");
    let service = AnalysisService::from_config(&cfg).expect("service");

    let entry = service
        .analyze("Manchester City", "Liverpool", false)
        .await
        .expect("analysis");
    assert!(entry
        .prediction_error
        .as_deref()
        .unwrap_or_default()
        .contains("HTTP 401"));

    let _ = tokio::fs::remove_file(&cfg.cache.path).await;
}
