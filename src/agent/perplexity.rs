//! Perplexity API client for match analysis
//!
//! Talks to the OpenAI-compatible `/chat/completions` endpoint. The
//! `sonar-reasoning` model prefixes its answer with a `<think>` block,
//! which is removed before the text is handed back.

use crate::config::PredictorConfig;
use crate::error::PredictionError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Models the assistant knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Reasoning,
}

/// Static limits for a model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSpec {
    pub name: &'static str,
    pub max_tokens: u32,
    pub temperature_range: (f32, f32),
}

impl ModelKind {
    pub fn spec(&self) -> ModelSpec {
        match self {
            ModelKind::Reasoning => ModelSpec {
                name: "sonar-reasoning",
                max_tokens: 4096,
                temperature_range: (0.1, 1.0),
            },
        }
    }
}

/// Single-prompt text completion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, PredictionError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Perplexity API client
pub struct PerplexityClient {
    config: PredictorConfig,
    http: Client,
}

impl PerplexityClient {
    /// Create a new client; fails on an out-of-range temperature
    pub fn new(config: PredictorConfig) -> Result<Self, PredictionError> {
        let spec = config.model.spec();
        let (low, high) = spec.temperature_range;
        if !(low..=high).contains(&config.temperature) {
            return Err(PredictionError::InvalidSettings(format!(
                "temperature {} outside {}..={} for {}",
                config.temperature, low, high, spec.name
            )));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                PredictionError::InvalidSettings(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, http })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn model(&self) -> ModelSpec {
        self.config.model.spec()
    }

    /// Send one user message and return the answer text
    pub async fn chat(&self, prompt: &str) -> Result<String, PredictionError> {
        if !self.is_configured() {
            return Err(PredictionError::MissingApiKey);
        }

        let spec = self.model();
        let request = ChatRequest {
            model: spec.name.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
            max_tokens: spec.max_tokens,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        debug!("Sending request to Perplexity ({})", spec.name);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PredictionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Perplexity API error: {} - {}", status, body);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PredictionError::Auth {
                    status: status.as_u16(),
                },
                StatusCode::TOO_MANY_REQUESTS => PredictionError::RateLimited,
                _ => PredictionError::Upstream {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PredictionError::Malformed(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| strip_reasoning(&c.message.content))
            .ok_or_else(|| PredictionError::Malformed("response has no choices".to_string()))?;

        if content.is_empty() {
            return Err(PredictionError::Malformed("empty answer".to_string()));
        }

        debug!("Perplexity response received: {} chars", content.len());
        Ok(content)
    }
}

#[async_trait]
impl CompletionClient for PerplexityClient {
    async fn complete(&self, prompt: &str) -> Result<String, PredictionError> {
        self.chat(prompt).await
    }
}

/// Drop `<think>...</think>` sections emitted by reasoning models
fn strip_reasoning(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<think>") {
        out.push_str(&rest[..start]);
        match rest[start..].find("</think>") {
            Some(end) => rest = &rest[start + end + "</think>".len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_registry() {
        let spec = ModelKind::Reasoning.spec();
        assert_eq!(spec.name, "sonar-reasoning");
        assert_eq!(spec.max_tokens, 4096);
        assert_eq!(spec.temperature_range, (0.1, 1.0));

        let kind: ModelKind = serde_json::from_str("\"reasoning\"").unwrap();
        assert_eq!(kind, ModelKind::Reasoning);
        assert!(serde_json::from_str::<ModelKind>("\"turbo\"").is_err());
    }

    #[test]
    fn test_rejects_out_of_range_temperature() {
        let config = PredictorConfig {
            temperature: 0.05,
            ..PredictorConfig::default()
        };
        assert!(matches!(
            PerplexityClient::new(config),
            Err(PredictionError::InvalidSettings(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let config = PredictorConfig {
            api_key: "   ".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            ..PredictorConfig::default()
        };
        let client = PerplexityClient::new(config).unwrap();
        assert!(matches!(
            client.chat("hello").await,
            Err(PredictionError::MissingApiKey)
        ));
    }

    #[test]
    fn test_strip_reasoning() {
        let text = "<think>weigh form and injuries</think>\n\nLiverpool win, 60%";
        assert_eq!(strip_reasoning(text), "Liverpool win, 60%");
        assert_eq!(strip_reasoning("plain answer"), "plain answer");
        assert_eq!(strip_reasoning("<think>never closed"), "");
    }
}
