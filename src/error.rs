use thiserror::Error;

/// Main error type for the betting assistant
#[derive(Error, Debug)]
pub enum MatchdayError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Component errors
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for MatchdayError
pub type Result<T> = std::result::Result<T, MatchdayError>;

/// Failures while pulling odds from the bookmaker
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("Odds source unreachable: {0}")]
    Network(String),

    #[error("Odds source timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Odds source returned HTTP {status}")]
    Status { status: u16 },

    #[error("Odds page layout changed: {0}")]
    Layout(String),
}

impl FetchError {
    /// Whether a second attempt has a chance of succeeding
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::Timeout { .. } => true,
            FetchError::Status { status } => *status >= 500,
            FetchError::Layout(_) => false,
        }
    }
}

/// Failures of the local snapshot file
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("No cached odds snapshot")]
    Empty,

    #[error("Cached odds snapshot is corrupt: {0}")]
    Corrupt(String),

    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the AI prediction service
#[derive(Error, Debug, Clone)]
pub enum PredictionError {
    #[error("PPLX_API_KEY is not configured")]
    MissingApiKey,

    #[error("Prediction service rejected credentials (HTTP {status})")]
    Auth { status: u16 },

    #[error("Prediction service rate limited the request")]
    RateLimited,

    #[error("Prediction service error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Prediction service unreachable: {0}")]
    Network(String),

    #[error("Malformed prediction response: {0}")]
    Malformed(String),

    #[error("Invalid predictor settings: {0}")]
    InvalidSettings(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_retryable() {
        assert!(FetchError::Network("reset".into()).is_retryable());
        assert!(FetchError::Timeout { elapsed_ms: 15_000 }.is_retryable());
        assert!(FetchError::Status { status: 502 }.is_retryable());
        assert!(!FetchError::Status { status: 404 }.is_retryable());
        assert!(!FetchError::Layout("no events".into()).is_retryable());
    }

    #[test]
    fn test_component_errors_convert() {
        let err: MatchdayError = PredictionError::MissingApiKey.into();
        assert_eq!(err.to_string(), "PPLX_API_KEY is not configured");

        let err: MatchdayError = CacheError::Empty.into();
        assert!(matches!(err, MatchdayError::Cache(CacheError::Empty)));
    }
}
