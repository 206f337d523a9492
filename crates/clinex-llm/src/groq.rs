//! Groq Provider Implementation
//!
//! Talks to Groq's hosted chat-completion API, which follows the OpenAI
//! `/chat/completions` wire format.
//!
//! # Features
//!
//! - Async HTTP communication with bearer authentication
//! - Configurable endpoint, model and sampling temperature
//! - Optional request timeout (unset means the call may wait indefinitely)
//!
//! No retries are attempted; a failed call is reported once.
//!
//! # Examples
//!
//! ```no_run
//! use clinex_llm::{GroqConfig, GroqProvider};
//!
//! let provider = GroqProvider::new("gsk_...", GroqConfig::default()).unwrap();
//! ```

use crate::LlmError;
use clinex_domain::traits::LlmProvider as LlmProviderTrait;
use clinex_domain::ChatMessage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Groq API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Settings for the Groq provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroqConfig {
    /// API base URL, without the trailing `/chat/completions`
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature; 0 for deterministic output
    pub temperature: f32,

    /// Per-request timeout in seconds; `None` waits indefinitely
    pub request_timeout_secs: Option<u64>,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            request_timeout_secs: None,
        }
    }
}

impl GroqConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("llm.base_url must not be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("llm.model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("llm.temperature must be between 0 and 2".to_string());
        }
        if self.request_timeout_secs == Some(0) {
            return Err("llm.request_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Groq chat-completion provider
#[derive(Debug, Clone)]
pub struct GroqProvider {
    api_key: String,
    config: GroqConfig,
    client: reqwest::Client,
}

/// Request body for the chat-completion API
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [ChatMessage],
}

/// Response from the chat-completion API
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl GroqProvider {
    /// Create a new Groq provider
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the API key is empty, the config does
    /// not validate, or the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, config: GroqConfig) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("API key must not be empty".to_string()));
        }
        config.validate().map_err(LlmError::Config)?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            config,
            client,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &GroqConfig {
        &self.config
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Send a chat exchange and return the trimmed content of the first choice
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The API cannot be reached
    /// - The API answers with a non-success status
    /// - The response body is not a chat completion, or has no content
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let url = self.completions_url();
        let request_body = ChatCompletionRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages,
        };

        debug!(
            "Requesting completion from {} ({} messages)",
            self.config.model,
            messages.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Completion request failed with HTTP {}", status);
            return Err(match status {
                reqwest::StatusCode::NOT_FOUND => {
                    LlmError::ModelNotAvailable(self.config.model.clone())
                }
                reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
                _ => LlmError::Api {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        first_choice_content(completion)
    }
}

fn first_choice_content(completion: ChatCompletionResponse) -> Result<String, LlmError> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("Response has no choices".to_string()))?;

    choice
        .message
        .content
        .map(|content| content.trim().to_string())
        .ok_or_else(|| LlmError::InvalidResponse("Reply has no content".to_string()))
}

impl LlmProviderTrait for GroqProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, Self::Error> {
        self.chat(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_provider_creation() {
        let provider = GroqProvider::new("key", GroqConfig::default()).unwrap();
        assert_eq!(provider.config().model, DEFAULT_MODEL);
        assert_eq!(provider.config().temperature, 0.0);
        assert_eq!(provider.model_name(), "llama-3.1-8b-instant");
    }

    #[test]
    fn test_groq_provider_rejects_empty_key() {
        let result = GroqProvider::new("  ", GroqConfig::default());
        assert!(matches!(result, Err(LlmError::Config(_))));
    }

    #[test]
    fn test_completions_url_strips_trailing_slash() {
        let config = GroqConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..GroqConfig::default()
        };
        let provider = GroqProvider::new("key", config).unwrap();
        assert_eq!(
            provider.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(GroqConfig::default().validate().is_ok());

        let mut config = GroqConfig::default();
        config.temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = GroqConfig::default();
        config.request_timeout_secs = Some(0);
        assert!(config.validate().is_err());

        let mut config = GroqConfig::default();
        config.model = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("note")];
        let body = ChatCompletionRequest {
            model: DEFAULT_MODEL,
            temperature: 0.0,
            messages: &messages,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "llama-3.1-8b-instant");
        assert_eq!(value["temperature"], 0.0);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "note");
    }

    #[test]
    fn test_first_choice_content_is_trimmed() {
        let completion: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "  {\"a\": 1}\n"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_content(completion).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_first_choice_content_missing() {
        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            first_choice_content(empty),
            Err(LlmError::InvalidResponse(_))
        ));

        let null_content: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert!(matches!(
            first_choice_content(null_content),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_groq_error_handling() {
        // Use invalid endpoint to trigger error
        let config = GroqConfig {
            base_url: "http://localhost:99999".to_string(),
            ..GroqConfig::default()
        };
        let provider = GroqProvider::new("key", config).unwrap();

        let result = provider.chat(&[ChatMessage::user("test")]).await;
        match result {
            Err(LlmError::Communication(_)) => {} // Expected
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }

    /// Serve a fixed reply on `/chat/completions` and return a provider aimed at it
    async fn provider_answering(status: u16, body: &'static str) -> GroqProvider {
        use axum::{http::StatusCode, routing::post, Router};

        let status = StatusCode::from_u16(status).unwrap();
        let app = Router::new().route(
            "/chat/completions",
            post(move || async move { (status, body) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = GroqConfig {
            base_url: format!("http://{}", addr),
            ..GroqConfig::default()
        };
        GroqProvider::new("key", config).unwrap()
    }

    #[tokio::test]
    async fn test_successful_completion() {
        let provider = provider_answering(
            200,
            r#"{"choices": [{"message": {"role": "assistant", "content": " {\"age\": 40} "}}]}"#,
        )
        .await;

        let reply = provider.chat(&[ChatMessage::user("note")]).await.unwrap();
        assert_eq!(reply, r#"{"age": 40}"#);
    }

    #[tokio::test]
    async fn test_unknown_model_status() {
        let provider = provider_answering(404, "model not found").await;

        let err = provider.chat(&[ChatMessage::user("note")]).await.unwrap_err();
        assert!(matches!(err, LlmError::ModelNotAvailable(ref model) if model == DEFAULT_MODEL));
        assert_eq!(err.to_string(), "Model not available: llama-3.1-8b-instant");
    }

    #[tokio::test]
    async fn test_rate_limit_status() {
        let provider = provider_answering(429, "slow down").await;

        let err = provider.chat(&[ChatMessage::user("note")]).await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimitExceeded));
        assert_eq!(err.to_string(), "Rate limit exceeded");
    }

    #[tokio::test]
    async fn test_server_error_keeps_status_and_body() {
        let provider = provider_answering(500, "upstream exploded").await;

        let err = provider.chat(&[ChatMessage::user("note")]).await.unwrap_err();
        match &err {
            LlmError::Api { status, body } => {
                assert_eq!(*status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
        assert_eq!(err.to_string(), "HTTP 500: upstream exploded");
    }

    #[tokio::test]
    async fn test_non_completion_body() {
        let provider = provider_answering(200, r#"{"object": "list", "data": []}"#).await;

        let err = provider.chat(&[ChatMessage::user("note")]).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
        assert!(err
            .to_string()
            .starts_with("Invalid response: Failed to parse response: "));
    }

    #[tokio::test]
    async fn test_completion_without_choices() {
        let provider = provider_answering(200, r#"{"choices": []}"#).await;

        let err = provider.chat(&[ChatMessage::user("note")]).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid response: Response has no choices");
    }
}
