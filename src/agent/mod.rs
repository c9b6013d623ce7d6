//! AI prediction integration
//!
//! - Perplexity: chat completions client and model registry
//! - Predictor: the four-step match analysis chain built on top of it

pub mod perplexity;
pub mod predictor;

pub use perplexity::{ChatMessage, CompletionClient, ModelKind, ModelSpec, PerplexityClient};
pub use predictor::{MatchPredictor, Predictor};
