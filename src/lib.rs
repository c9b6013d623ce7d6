pub mod adapters;
pub mod agent;
pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod services;

pub use adapters::{BetpawaScraper, OddsSource};
pub use agent::{MatchPredictor, PerplexityClient, Predictor};
pub use config::AppConfig;
pub use domain::{AnalysisEntry, MatchOdds, OddsSnapshot, Prediction};
pub use error::{MatchdayError, Result};
pub use persistence::SnapshotCache;
pub use services::AnalysisService;
