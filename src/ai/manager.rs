//! Provider coordination.
//!
//! [`AiManager`] holds one client per configured provider and exposes the
//! same [`TextGenerator`] trait the clients do, adding a per-request timeout,
//! retries on transport failures and failover to a fallback provider. The
//! pipeline only ever sees the trait, so a manager and a bare client are
//! interchangeable.

use super::client::{GeminiClient, GeminiConfig, OpenAiClient, OpenAiConfig};
use super::{AiError, Provider, TextGenerator};
use crate::config::AiConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

pub struct AiManager {
    clients: HashMap<Provider, Box<dyn TextGenerator>>,
    default_provider: Provider,
    fallback_provider: Option<Provider>,
    default_model: String,
    fallback_model: Option<String>,
    request_timeout: Duration,
    max_retries: usize,
}

impl AiManager {
    pub fn new(default_provider: Provider, default_model: impl Into<String>) -> Self {
        Self {
            clients: HashMap::new(),
            default_provider,
            fallback_provider: None,
            default_model: default_model.into(),
            fallback_model: None,
            request_timeout: Duration::from_secs(60),
            max_retries: 0,
        }
    }

    /// Build a manager from configuration, registering a client for every
    /// provider that has an API key. Fails only when no provider is usable.
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let default_provider = Provider::parse(&config.default_provider).ok_or_else(|| {
            AiError::Configuration(format!("unknown provider '{}'", config.default_provider))
        })?;

        let mut manager = Self::new(default_provider, config.default_model.clone())
            .with_timeout(Duration::from_secs(config.request_timeout_seconds))
            .with_retries(config.max_retries);

        if let Some(name) = &config.fallback_provider {
            let fallback = Provider::parse(name).ok_or_else(|| {
                AiError::Configuration(format!("unknown fallback provider '{}'", name))
            })?;
            manager.fallback_provider = Some(fallback);
            manager.fallback_model = config.fallback_model.clone();
        }

        if let Some(api_key) = config.openai_api_key() {
            let mut client_config = OpenAiConfig::default();
            client_config.api_key = api_key;
            client_config.timeout = Duration::from_secs(config.request_timeout_seconds);
            client_config.temperature = config.temperature;
            client_config.max_tokens = config.max_tokens;
            if let Some(base_url) = config.openai_base_url() {
                client_config.base_url = base_url;
            }

            match OpenAiClient::new(client_config) {
                Ok(client) => manager.register(Provider::OpenAi, Box::new(client)),
                Err(err) => tracing::warn!(error = %err, "failed to initialize OpenAI client"),
            }
        }

        if let Some(api_key) = config.gemini_api_key() {
            let mut client_config = GeminiConfig::default();
            client_config.api_key = api_key;
            client_config.timeout = Duration::from_secs(config.request_timeout_seconds);
            client_config.temperature = config.temperature;
            client_config.max_tokens = config.max_tokens;
            if let Some(base_url) = config.gemini_base_url() {
                client_config.base_url = base_url;
            }

            match GeminiClient::new(client_config) {
                Ok(client) => manager.register(Provider::Gemini, Box::new(client)),
                Err(err) => tracing::warn!(error = %err, "failed to initialize Gemini client"),
            }
        }

        if manager.clients.is_empty() {
            return Err(AiError::NoProvider);
        }

        // The configured default may have no key; fall back to whichever
        // provider does rather than refusing to start.
        if !manager.clients.contains_key(&manager.default_provider) {
            if let Some(&available) = manager.clients.keys().next() {
                tracing::warn!(
                    requested = %manager.default_provider,
                    using = %available,
                    "default provider has no API key, switching"
                );
                manager.default_provider = available;
            }
        }

        Ok(manager)
    }

    pub fn register(&mut self, provider: Provider, client: Box<dyn TextGenerator>) {
        self.clients.insert(provider, client);
    }

    pub fn with_fallback(mut self, provider: Provider, model: impl Into<String>) -> Self {
        self.fallback_provider = Some(provider);
        self.fallback_model = Some(model.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn default_provider(&self) -> Provider {
        self.default_provider
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn is_provider_available(&self, provider: Provider) -> bool {
        self.clients.contains_key(&provider)
    }

    async fn generate_with(
        &self,
        provider: Provider,
        prompt: &str,
        model: &str,
    ) -> Result<String, AiError> {
        let client = self.clients.get(&provider).ok_or(AiError::NoProvider)?;

        match tokio::time::timeout(self.request_timeout, client.generate(prompt, model)).await {
            Ok(result) => result,
            Err(_) => Err(AiError::Timeout(self.request_timeout.as_secs())),
        }
    }
}

#[async_trait]
impl TextGenerator for AiManager {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, AiError> {
        let model = if model.is_empty() {
            self.default_model.as_str()
        } else {
            model
        };

        let mut last_error = AiError::NoProvider;
        for attempt in 0..=self.max_retries {
            match self.generate_with(self.default_provider, prompt, model).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_transport() => {
                    tracing::warn!(
                        provider = %self.default_provider,
                        attempt,
                        error = %err,
                        "generation attempt failed"
                    );
                    last_error = err;
                }
                Err(AiError::NoProvider) => {
                    last_error = AiError::NoProvider;
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        if let Some(fallback) = self.fallback_provider {
            if fallback != self.default_provider && self.clients.contains_key(&fallback) {
                let fallback_model = self.fallback_model.as_deref().unwrap_or(model);
                tracing::info!(
                    provider = %fallback,
                    model = fallback_model,
                    "failing over to fallback provider"
                );
                return self.generate_with(fallback, prompt, fallback_model).await;
            }
        }

        Err(last_error)
    }

    async fn health_check(&self) -> bool {
        match self.clients.get(&self.default_provider) {
            Some(client) => client.health_check().await,
            None => false,
        }
    }

    fn provider_name(&self) -> &str {
        self.default_provider.as_str()
    }
}

impl std::fmt::Debug for AiManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiManager")
            .field("default_provider", &self.default_provider)
            .field("fallback_provider", &self.fallback_provider)
            .field("default_model", &self.default_model)
            .field("available", &self.clients.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFailure, MockTextGenerator};
    use std::sync::Arc;

    fn manager_with(default: Arc<MockTextGenerator>) -> AiManager {
        let mut manager = AiManager::new(Provider::OpenAi, "gpt-4o-mini");
        manager.register(Provider::OpenAi, Box::new(default));
        manager
    }

    #[tokio::test]
    async fn uses_the_default_provider() {
        let mock = Arc::new(MockTextGenerator::new().reply("hello"));
        let manager = manager_with(mock.clone());

        let reply = manager.generate("say hello", "gpt-4o-mini").await.unwrap();
        assert_eq!(reply, "hello");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.calls()[0].0, "say hello");
    }

    #[tokio::test]
    async fn empty_model_falls_back_to_the_default_model() {
        let mock = Arc::new(MockTextGenerator::new().reply("ok"));
        let manager = manager_with(mock.clone());

        manager.generate("prompt", "").await.unwrap();
        assert_eq!(mock.calls()[0].1, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn retries_transport_failures_then_fails_over() {
        let primary = Arc::new(MockTextGenerator::with_failure(MockFailure::Network));
        let fallback = Arc::new(MockTextGenerator::new().reply("rescued"));

        let mut manager = AiManager::new(Provider::OpenAi, "gpt-4o-mini")
            .with_retries(2)
            .with_fallback(Provider::Gemini, "gemini-2.0-flash");
        manager.register(Provider::OpenAi, Box::new(primary.clone()));
        manager.register(Provider::Gemini, Box::new(fallback.clone()));

        let reply = manager.generate("prompt", "").await.unwrap();
        assert_eq!(reply, "rescued");
        assert_eq!(primary.call_count(), 3);
        assert_eq!(fallback.call_count(), 1);
        assert_eq!(fallback.calls()[0].1, "gemini-2.0-flash");
    }

    #[tokio::test]
    async fn auth_errors_do_not_fail_over() {
        let primary = Arc::new(MockTextGenerator::with_failure(MockFailure::Auth));
        let fallback = Arc::new(MockTextGenerator::new().reply("unused"));

        let mut manager = AiManager::new(Provider::OpenAi, "gpt-4o-mini")
            .with_fallback(Provider::Gemini, "gemini-2.0-flash");
        manager.register(Provider::OpenAi, Box::new(primary.clone()));
        manager.register(Provider::Gemini, Box::new(fallback.clone()));

        let result = manager.generate("prompt", "").await;
        assert!(matches!(result, Err(AiError::Auth(_))));
        assert_eq!(fallback.call_count(), 0);
    }

    #[tokio::test]
    async fn slow_requests_time_out() {
        let mock = Arc::new(
            MockTextGenerator::new()
                .reply("too late")
                .with_delay(Duration::from_millis(200)),
        );
        let mut manager = AiManager::new(Provider::OpenAi, "gpt-4o-mini")
            .with_timeout(Duration::from_millis(20));
        manager.register(Provider::OpenAi, Box::new(mock));

        let result = manager.generate("prompt", "").await;
        assert!(matches!(result, Err(AiError::Timeout(_))));
    }

    #[tokio::test]
    async fn missing_provider_reports_no_provider() {
        let manager = AiManager::new(Provider::OpenAi, "gpt-4o-mini");
        let result = manager.generate("prompt", "").await;
        assert!(matches!(result, Err(AiError::NoProvider)));
    }

    #[test]
    fn from_config_rejects_unknown_providers() {
        let mut config = AiConfig::default();
        config.default_provider = "llamacpp".to_string();

        let result = AiManager::from_config(&config);
        assert!(matches!(result, Err(AiError::Configuration(_))));
    }
}
