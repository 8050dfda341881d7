//! HTTP clients for the supported AI providers.
//!
//! Both clients speak their provider's native JSON wire format and map HTTP
//! status codes onto [`AiError`] the same way, so the manager can treat them
//! interchangeably.

use super::{AiError, TextGenerator};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI client configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(120),
            temperature: 0.7,
            max_tokens: 4000,
        }
    }
}

/// Client for the OpenAI chat-completions API.
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatCompletionMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatCompletionMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
    usage: Option<ChatCompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, AiError> {
        if config.api_key.trim().is_empty() {
            return Err(AiError::Configuration("OpenAI API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatCompletionMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_request_error(e, self.config.timeout))?;

        if !response.status().is_success() {
            return Err(handle_response_error(response).await);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?;

        if let Some(usage) = &completion.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                model,
                "chat completion usage"
            );
        }

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AiError::InvalidResponse("completion had no choices".to_string()))
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/models", self.config.base_url);
        match self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout: Duration::from_secs(120),
            temperature: 0.7,
            max_tokens: 4000,
        }
    }
}

/// Client for the Gemini `generateContent` API.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiGenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        if config.api_key.trim().is_empty() {
            return Err(AiError::Configuration("Gemini API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, AiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, model
        );
        let request = GenerateContentRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
                role: None,
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| map_request_error(e, self.config.timeout))?;

        if !response.status().is_success() {
            return Err(handle_response_error(response).await);
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?;

        let content = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .ok_or_else(|| AiError::InvalidResponse("response had no candidates".to_string()))?;

        let text: String = content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(AiError::InvalidResponse("candidate had no text parts".to_string()));
        }

        Ok(text)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/v1beta/models", self.config.base_url);
        match self
            .client
            .get(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}

fn map_request_error(err: reqwest::Error, timeout: Duration) -> AiError {
    if err.is_timeout() {
        AiError::Timeout(timeout.as_secs())
    } else {
        AiError::Network(err.to_string())
    }
}

/// Map a non-success HTTP response onto the shared error taxonomy.
async fn handle_response_error(response: Response) -> AiError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    match status.as_u16() {
        401 | 403 => AiError::Auth(text),
        404 => AiError::ModelNotFound(text),
        429 => AiError::RateLimit,
        500..=599 => AiError::ServiceUnavailable(format!("server error: {}", text)),
        _ => AiError::Network(format!("HTTP {}: {}", status, text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chat_completion_request_serializes_to_the_wire_shape() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatCompletionMessage {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
            temperature: 0.7,
            max_tokens: 4000,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hello");
        assert_eq!(value["max_tokens"], 4000);
    }

    #[test]
    fn chat_completion_response_yields_first_choice_content() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "first"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "second"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;

        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        let content = parsed.choices.into_iter().next().unwrap().message.content;
        assert_eq!(content, "first");
    }

    #[test]
    fn empty_choices_deserialize_without_error() {
        let parsed: ChatCompletionResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.choices.is_empty());
        assert!(parsed.usage.is_none());
    }

    #[test]
    fn generate_content_request_uses_camel_case_config() {
        let request = GenerateContentRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: "hi".to_string(),
                }],
                role: None,
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.5,
                max_output_tokens: 2000,
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 2000);
        assert!(value["contents"][0].get("role").is_none());
    }

    #[test]
    fn generate_content_response_joins_candidate_parts() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "one "}, {"text": "two"}], "role": "model"}, "finishReason": "STOP"}
            ]
        }"#;

        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let content = parsed.candidates.into_iter().next().unwrap().content.unwrap();
        let text: String = content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");
        assert_eq!(text, "one two");
    }

    #[test]
    fn clients_reject_empty_api_keys() {
        let openai = OpenAiClient::new(OpenAiConfig::default());
        assert!(matches!(openai, Err(AiError::Configuration(_))));

        let gemini = GeminiClient::new(GeminiConfig {
            api_key: "   ".to_string(),
            ..GeminiConfig::default()
        });
        assert!(matches!(gemini, Err(AiError::Configuration(_))));
    }
}
