//! Test doubles for the AI seam.

use crate::ai::{AiError, TextGenerator};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Failure kinds a mock can be told to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Network,
    Timeout,
    Auth,
    RateLimit,
    Invalid,
}

impl MockFailure {
    fn to_error(self) -> AiError {
        match self {
            MockFailure::Network => AiError::Network("mock network failure".to_string()),
            MockFailure::Timeout => AiError::Timeout(30),
            MockFailure::Auth => AiError::Auth("mock auth failure".to_string()),
            MockFailure::RateLimit => AiError::RateLimit,
            MockFailure::Invalid => AiError::InvalidResponse("mock invalid response".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Failure(MockFailure),
}

impl MockReply {
    fn into_result(self) -> Result<String, AiError> {
        match self {
            MockReply::Text(text) => Ok(text),
            MockReply::Failure(failure) => Err(failure.to_error()),
        }
    }
}

/// Scripted [`TextGenerator`] with a call log.
///
/// Replies are resolved in order: first matching route (by prompt
/// substring), then the next scripted reply, then the standing failure.
/// Routes are not consumed, so parallel requests can each hit their own
/// route regardless of scheduling order.
pub struct MockTextGenerator {
    routes: Vec<(String, MockReply)>,
    script: Mutex<VecDeque<MockReply>>,
    default_failure: Option<MockFailure>,
    delay: Option<Duration>,
    healthy: bool,
    name: String,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            script: Mutex::new(VecDeque::new()),
            default_failure: None,
            delay: None,
            healthy: true,
            name: "mock".to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A generator where every request fails the same way.
    pub fn with_failure(failure: MockFailure) -> Self {
        let mut mock = Self::new();
        mock.default_failure = Some(failure);
        mock.healthy = false;
        mock
    }

    /// Queue a reply, returned once in script order.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(MockReply::Text(text.into()));
        self
    }

    /// Queue a one-shot failure.
    pub fn reply_failure(self, failure: MockFailure) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(MockReply::Failure(failure));
        self
    }

    /// Answer any prompt containing `needle` with `text`.
    pub fn route(mut self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.routes.push((needle.into(), MockReply::Text(text.into())));
        self
    }

    /// Fail any prompt containing `needle`.
    pub fn route_failure(mut self, needle: impl Into<String>, failure: MockFailure) -> Self {
        self.routes.push((needle.into(), MockReply::Failure(failure)));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Every `(prompt, model)` pair received, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Default for MockTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, AiError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((prompt.to_string(), model.to_string()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        for (needle, reply) in &self.routes {
            if prompt.contains(needle.as_str()) {
                return reply.clone().into_result();
            }
        }

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        if let Some(reply) = scripted {
            return reply.into_result();
        }

        if let Some(failure) = self.default_failure {
            return Err(failure.to_error());
        }

        Err(AiError::InvalidResponse(format!(
            "no scripted reply for prompt: {}",
            prompt.chars().take(80).collect::<String>()
        )))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn script_replies_in_order_then_runs_dry() {
        let mock = MockTextGenerator::new().reply("one").reply("two");

        assert_eq!(mock.generate("a", "m").await.unwrap(), "one");
        assert_eq!(mock.generate("b", "m").await.unwrap(), "two");
        assert!(matches!(
            mock.generate("c", "m").await,
            Err(AiError::InvalidResponse(_))
        ));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn routes_win_over_the_script_and_are_reusable() {
        let mock = MockTextGenerator::new()
            .route("structure", "routed")
            .reply("scripted");

        assert_eq!(mock.generate("give me structure", "m").await.unwrap(), "routed");
        assert_eq!(mock.generate("give me structure", "m").await.unwrap(), "routed");
        assert_eq!(mock.generate("other", "m").await.unwrap(), "scripted");
    }

    #[tokio::test]
    async fn standing_failure_applies_to_every_call() {
        let mock = MockTextGenerator::with_failure(MockFailure::Network);

        assert!(matches!(
            mock.generate("x", "m").await,
            Err(AiError::Network(_))
        ));
        assert!(matches!(
            mock.generate("y", "m").await,
            Err(AiError::Network(_))
        ));
        assert!(!mock.health_check().await);
    }
}
