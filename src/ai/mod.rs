//! AI provider clients and coordination.
//!
//! The generation pipeline talks to language models exclusively through the
//! [`TextGenerator`] trait, so orchestration code never knows which provider
//! answered. [`AiManager`] owns the provider registry, applies the request
//! timeout and fails over when the transport drops.

pub mod client;
pub mod manager;

pub use client::{GeminiClient, GeminiConfig, OpenAiClient, OpenAiConfig};
pub use manager::AiManager;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported AI providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Gemini,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }

    /// Parse a provider name as written in config files or CLI flags.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "openai" | "open-ai" | "gpt" => Some(Provider::OpenAi),
            "gemini" | "google" => Some(Provider::Gemini),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from AI provider interactions.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limit exceeded")]
    RateLimit,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no AI provider configured")]
    NoProvider,
}

impl AiError {
    /// Transport-level failures may succeed against another provider;
    /// everything else (bad key, unknown model) will not.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AiError::Network(_)
                | AiError::Timeout(_)
                | AiError::RateLimit
                | AiError::ServiceUnavailable(_)
        )
    }
}

/// A text generation backend.
///
/// One prompt in, one raw text reply out. Response decoding lives with the
/// callers; implementations only move bytes.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send a single prompt to the named model and return the raw reply.
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, AiError>;

    /// Whether the backend currently answers at all.
    async fn health_check(&self) -> bool;

    fn provider_name(&self) -> &str;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for std::sync::Arc<T> {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, AiError> {
        (**self).generate(prompt, model).await
    }

    async fn health_check(&self) -> bool {
        (**self).health_check().await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_common_spellings() {
        assert_eq!(Provider::parse("openai"), Some(Provider::OpenAi));
        assert_eq!(Provider::parse("OpenAI"), Some(Provider::OpenAi));
        assert_eq!(Provider::parse("gpt"), Some(Provider::OpenAi));
        assert_eq!(Provider::parse("gemini"), Some(Provider::Gemini));
        assert_eq!(Provider::parse("Google"), Some(Provider::Gemini));
        assert_eq!(Provider::parse("ollama"), None);
    }

    #[test]
    fn provider_round_trips_through_its_name() {
        for provider in [Provider::OpenAi, Provider::Gemini] {
            assert_eq!(Provider::parse(provider.as_str()), Some(provider));
        }
    }

    #[test]
    fn transport_errors_are_the_retryable_ones() {
        assert!(AiError::Network("reset".into()).is_transport());
        assert!(AiError::Timeout(30).is_transport());
        assert!(AiError::RateLimit.is_transport());
        assert!(AiError::ServiceUnavailable("503".into()).is_transport());

        assert!(!AiError::Auth("bad key".into()).is_transport());
        assert!(!AiError::ModelNotFound("gpt-9".into()).is_transport());
        assert!(!AiError::InvalidResponse("empty".into()).is_transport());
        assert!(!AiError::NoProvider.is_transport());
    }
}
