use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::agent::perplexity::ModelKind;
use crate::error::Result;

/// Environment variable carrying the Perplexity credential
pub const API_KEY_ENV: &str = "PPLX_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub predictor: PredictorConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Betpawa events page
    pub base_url: String,
    pub user_agent: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Extra attempts after the first failure (network / 5xx only)
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// Betting market to list (1X2 = home / draw / away)
    pub market_id: String,
    /// Comma separated Betpawa competition ids
    pub competitions: String,
    /// Sport category (2 = football)
    pub category_id: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.betpawa.co.tz/events".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            timeout_secs: 15,
            max_retries: 1,
            retry_delay_ms: 500,
            market_id: "1X2".to_string(),
            competitions: "11965,12541,12546,12545,12097,12110,12039,12127,12355".to_string(),
            category_id: "2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Snapshot file location
    pub path: PathBuf,
    /// Seconds a snapshot stays fresh (default: 15 minutes)
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("betpawa_cache.json"),
            ttl_secs: 900,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Filled from PPLX_API_KEY when present
    pub api_key: String,
    pub base_url: String,
    pub model: ModelKind,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.perplexity.ai".to_string(),
            model: ModelKind::Reasoning,
            temperature: 0.5,
            timeout_secs: 120,
        }
    }
}

impl PredictorConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Analyses kept in memory for the dashboard
    pub history_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            history_limit: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable JSON formatted logs
    pub json: bool,
    /// Directory for the rolling log file; console only when unset
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("MATCHDAY_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (MATCHDAY__SERVER__PORT, etc.)
            .add_source(
                Environment::with_prefix("MATCHDAY")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: AppConfig = builder.build()?.try_deserialize()?;
        cfg.apply_api_key_env();
        Ok(cfg)
    }

    /// The credential always comes from PPLX_API_KEY when it is set
    fn apply_api_key_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.predictor.api_key = key.trim().to_string();
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if reqwest::Url::parse(&self.scraper.base_url).is_err() {
            errors.push(format!("scraper.base_url is not a URL: {}", self.scraper.base_url));
        }
        if self.scraper.timeout_secs == 0 {
            errors.push("scraper.timeout_secs must be positive".to_string());
        }

        if reqwest::Url::parse(&self.predictor.base_url).is_err() {
            errors.push(format!(
                "predictor.base_url is not a URL: {}",
                self.predictor.base_url
            ));
        }
        let spec = self.predictor.model.spec();
        let (low, high) = spec.temperature_range;
        if !(low..=high).contains(&self.predictor.temperature) {
            errors.push(format!(
                "predictor.temperature {} outside {}..={} for {}",
                self.predictor.temperature, low, high, spec.name
            ));
        }
        if self.predictor.timeout_secs == 0 {
            errors.push("predictor.timeout_secs must be positive".to_string());
        }

        if self.server.port == 0 {
            errors.push("server.port must be non-zero".to_string());
        }
        if self.server.history_limit == 0 {
            errors.push("server.history_limit must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
