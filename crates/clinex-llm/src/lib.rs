//! Clinex LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `clinex-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `GroqProvider`: Hosted Groq chat-completion API (OpenAI-compatible)
//!
//! # Examples
//!
//! ```
//! use clinex_domain::traits::LlmProvider;
//! use clinex_domain::ChatMessage;
//! use clinex_llm::MockProvider;
//!
//! # async fn example() {
//! let provider = MockProvider::new(r#"{"name": null}"#);
//! let reply = provider.complete(&[ChatMessage::user("note")]).await.unwrap();
//! assert_eq!(reply, r#"{"name": null}"#);
//! # }
//! ```

#![warn(missing_docs)]

pub mod groq;

use clinex_domain::traits::LlmProvider as LlmProviderTrait;
use clinex_domain::{ChatMessage, Role};
use std::collections::HashMap;
use std::future::{ready, Future};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use groq::{GroqConfig, GroqProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// Non-success HTTP status from the provider
    #[error("HTTP {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider misconfigured
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(String),
}

/// Mock LLM provider for deterministic testing
///
/// Replies are keyed by the content of the last user message. Anything
/// without a specific reply gets the default response. The provider
/// never touches the network.
///
/// # Examples
///
/// ```
/// use clinex_llm::MockProvider;
///
/// let mut provider = MockProvider::default();
/// provider.add_response("note one", r#"{"age": 40}"#);
/// provider.add_error("note two", "upstream unavailable");
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
    default_reply: MockReply,
    responses: Arc<Mutex<HashMap<String, MockReply>>>,
    call_count: Arc<Mutex<usize>>,
    last_messages: Arc<Mutex<Vec<ChatMessage>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            model: "mock".to_string(),
            default_reply: MockReply::Text(response.into()),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a MockProvider that fails every call with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        let mut provider = Self::new("");
        provider.default_reply = MockReply::Error(message.into());
        provider
    }

    /// Add a specific response for a given user message
    pub fn add_response(&mut self, user_message: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(user_message.into(), MockReply::Text(response.into()));
    }

    /// Configure to return an error for a specific user message
    pub fn add_error(&mut self, user_message: impl Into<String>, message: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(user_message.into(), MockReply::Error(message.into()));
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }

    /// Messages passed to the most recent call
    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.last_messages.lock().unwrap().clone()
    }

    fn respond(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        *self.call_count.lock().unwrap() += 1;
        *self.last_messages.lock().unwrap() = messages.to_vec();

        let user_message = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let responses = self.responses.lock().unwrap();
        let reply = responses.get(user_message).unwrap_or(&self.default_reply);

        match reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Error(message) => Err(LlmError::Other(message.clone())),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.model
    }

    fn complete(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, Self::Error>> + Send {
        ready(self.respond(messages))
    }
}
