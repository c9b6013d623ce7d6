use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::odds::MatchOdds;
use super::prediction::{MatchRequest, Prediction};

/// One analysis run as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEntry {
    pub id: Uuid,
    pub requested_at: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    /// Bookmaker line for this match, when listed
    pub odds: Option<MatchOdds>,
    pub snapshot_captured_at: Option<DateTime<Utc>>,
    /// Odds came from an older snapshot because the refresh failed
    pub odds_stale: bool,
    pub prediction: Option<Prediction>,
    pub odds_error: Option<String>,
    pub prediction_error: Option<String>,
}

impl AnalysisEntry {
    pub fn new(request: &MatchRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            requested_at: Utc::now(),
            home_team: request.home_team.clone(),
            away_team: request.away_team.clone(),
            odds: None,
            snapshot_captured_at: None,
            odds_stale: false,
            prediction: None,
            odds_error: None,
            prediction_error: None,
        }
    }

    pub fn title(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}
