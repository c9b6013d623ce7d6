//! Refresh-and-predict orchestration behind the dashboard
//!
//! Odds refresh: fresh cache hit -> scrape -> save. A failed scrape never
//! touches the cache file, so the last good snapshot stays available.
//! Analysis: odds first, prediction second; either half may fail on its own
//! and the failure is recorded on the entry instead of aborting the run.

use crate::adapters::{BetpawaScraper, OddsSource};
use crate::agent::{MatchPredictor, PerplexityClient, Predictor};
use crate::config::AppConfig;
use crate::domain::{AnalysisEntry, MatchRequest, OddsQuery, OddsSnapshot};
use crate::error::{CacheError, FetchError, MatchdayError, PredictionError, Result};
use crate::persistence::SnapshotCache;
use chrono::Utc;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

/// Where a snapshot handed out by `refresh_odds` came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotOrigin {
    Cache,
    Scrape,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub origin: SnapshotOrigin,
    pub snapshot: OddsSnapshot,
}

/// Knobs taken from `AppConfig`
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub query: OddsQuery,
    pub ttl_secs: u64,
    pub history_limit: usize,
    /// False when PPLX_API_KEY is absent; the predictor is then never called
    pub predictor_configured: bool,
}

impl From<&AppConfig> for ServiceSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            query: OddsQuery::from(&cfg.scraper),
            ttl_secs: cfg.cache.ttl_secs,
            history_limit: cfg.server.history_limit.max(1),
            predictor_configured: cfg.predictor.is_configured(),
        }
    }
}

pub struct AnalysisService {
    source: Arc<dyn OddsSource>,
    cache: SnapshotCache,
    predictor: Arc<dyn Predictor>,
    settings: ServiceSettings,
    history: RwLock<VecDeque<AnalysisEntry>>,
    refresh_lock: Mutex<()>,
}

impl AnalysisService {
    pub fn new(
        source: Arc<dyn OddsSource>,
        cache: SnapshotCache,
        predictor: Arc<dyn Predictor>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            source,
            cache,
            predictor,
            settings,
            history: RwLock::new(VecDeque::new()),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Wire the production scraper, cache file and Perplexity chain
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let source = Arc::new(BetpawaScraper::new(cfg.scraper.clone())?);
        let llm = Arc::new(PerplexityClient::new(cfg.predictor.clone())?);
        let predictor = Arc::new(MatchPredictor::new(llm));
        let cache = SnapshotCache::new(cfg.cache.path.clone());

        if !cfg.predictor.is_configured() {
            warn!("PPLX_API_KEY not set: predictions are disabled, odds still work");
        }

        Ok(Self::new(source, cache, predictor, ServiceSettings::from(cfg)))
    }

    pub fn predictor_configured(&self) -> bool {
        self.settings.predictor_configured
    }

    /// Whatever is on disk, fresh or not
    pub async fn cached_snapshot(&self) -> Option<OddsSnapshot> {
        match self.cache.load().await {
            Ok(snapshot) => Some(snapshot),
            Err(CacheError::Empty) | Err(CacheError::Corrupt(_)) => None,
            Err(e) => {
                warn!("Could not read odds cache: {}", e);
                None
            }
        }
    }

    /// Current odds, from cache when fresh unless `force` is set
    pub async fn refresh_odds(
        &self,
        force: bool,
    ) -> std::result::Result<RefreshOutcome, FetchError> {
        let _guard = self.refresh_lock.lock().await;
        let key = self.settings.query.cache_key();

        if !force {
            if let Some(snapshot) = self.cached_snapshot().await {
                if snapshot.is_fresh(&key, self.settings.ttl_secs, Utc::now()) {
                    info!(
                        "Using cached odds from {} ({} matches)",
                        snapshot.captured_at,
                        snapshot.matches.len()
                    );
                    return Ok(RefreshOutcome {
                        origin: SnapshotOrigin::Cache,
                        snapshot,
                    });
                }
            }
        }

        let matches = self.source.fetch(&self.settings.query).await?;
        let snapshot = OddsSnapshot::new(&self.settings.query, matches);

        if let Err(e) = self.cache.save(&snapshot).await {
            error!(
                "Failed to persist odds snapshot to {}: {}",
                self.cache.path().display(),
                e
            );
        }

        Ok(RefreshOutcome {
            origin: SnapshotOrigin::Scrape,
            snapshot,
        })
    }

    /// Run odds lookup and prediction for one fixture and record it
    pub async fn analyze(
        &self,
        home_team: &str,
        away_team: &str,
        force_refresh: bool,
    ) -> Result<AnalysisEntry> {
        let request = MatchRequest::new(home_team, away_team);
        if request.home_team.is_empty() || request.away_team.is_empty() {
            return Err(MatchdayError::Validation(
                "home and away team are both required".to_string(),
            ));
        }
        if request.home_team.eq_ignore_ascii_case(&request.away_team) {
            return Err(MatchdayError::Validation(
                "home and away team must differ".to_string(),
            ));
        }

        let mut entry = AnalysisEntry::new(&request);

        let snapshot = match self.refresh_odds(force_refresh).await {
            Ok(outcome) => Some(outcome.snapshot),
            Err(e) => {
                warn!("Odds refresh failed for {}: {}", request.title(), e);
                entry.odds_error = Some(e.to_string());
                let stale = self.cached_snapshot().await;
                entry.odds_stale = stale.is_some();
                stale
            }
        };

        if let Some(snapshot) = &snapshot {
            entry.snapshot_captured_at = Some(snapshot.captured_at);
            entry.odds = snapshot
                .find_match(&request.home_team, &request.away_team)
                .cloned();
            if entry.odds.is_none() {
                info!("{} is not listed in the current odds", request.title());
            }
        }

        if !self.settings.predictor_configured {
            entry.prediction_error = Some(PredictionError::MissingApiKey.to_string());
        } else {
            match self.predictor.predict(&request, entry.odds.clone()).await {
                Ok(prediction) => entry.prediction = Some(prediction),
                Err(e) => {
                    warn!("Prediction failed for {}: {}", request.title(), e);
                    entry.prediction_error = Some(e.to_string());
                }
            }
        }

        self.record(entry.clone()).await;
        Ok(entry)
    }

    async fn record(&self, entry: AnalysisEntry) {
        let mut history = self.history.write().await;
        history.push_back(entry);
        while history.len() > self.settings.history_limit {
            history.pop_front();
        }
    }

    /// Oldest first
    pub async fn history(&self) -> Vec<AnalysisEntry> {
        self.history.read().await.iter().cloned().collect()
    }

    pub async fn latest(&self) -> Option<AnalysisEntry> {
        self.history.read().await.back().cloned()
    }
}
