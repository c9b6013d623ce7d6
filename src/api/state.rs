use crate::api::types::{FormState, Notice};
use crate::services::AnalysisService;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Odds + prediction orchestration
    pub service: Arc<AnalysisService>,

    /// Last values typed into the sidebar form
    pub form: Arc<RwLock<FormState>>,

    /// Banner for the next dashboard render (POST-redirect-GET)
    pub notice: Arc<RwLock<Option<Notice>>>,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: Arc<AnalysisService>) -> Self {
        Self {
            service,
            form: Arc::new(RwLock::new(FormState::default())),
            notice: Arc::new(RwLock::new(None)),
            start_time: Utc::now(),
        }
    }

    pub async fn set_notice(&self, notice: Notice) {
        *self.notice.write().await = Some(notice);
    }

    /// Take the pending banner; it is shown once
    pub async fn take_notice(&self) -> Option<Notice> {
        self.notice.write().await.take()
    }

    /// Get system uptime in seconds
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}
