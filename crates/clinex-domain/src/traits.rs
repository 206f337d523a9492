//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::ChatMessage;
use std::future::Future;

/// Trait for chat-completion providers
///
/// Implemented by the infrastructure layer (clinex-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Identifier of the model answering requests
    fn model_name(&self) -> &str;

    /// Send a chat exchange and return the raw text of the first reply
    fn complete(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}
