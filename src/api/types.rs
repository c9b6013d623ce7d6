use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisEntry, OddsSnapshot};
use crate::services::SnapshotOrigin;

// ============================================================================
// Health Check Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub cache: String,
    pub predictor_configured: bool,
    pub uptime_secs: i64,
    pub version: String,
}

// ============================================================================
// Odds Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot: Option<OddsSnapshot>,
    /// Seconds since capture
    pub age_secs: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshQuery {
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub origin: SnapshotOrigin,
    pub snapshot: OddsSnapshot,
}

// ============================================================================
// Analysis Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub force_refresh: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<AnalysisEntry>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// ============================================================================
// Dashboard Types
// ============================================================================

/// Fields of the sidebar form, kept between requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormState {
    pub home_team: String,
    pub away_team: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            home_team: "Manchester City".to_string(),
            away_team: "Liverpool".to_string(),
        }
    }
}

/// Sidebar form post; the checkbox is absent when unticked
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeForm {
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub force_refresh: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One-shot banner shown after a form action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            at: Utc::now(),
        }
    }
}
