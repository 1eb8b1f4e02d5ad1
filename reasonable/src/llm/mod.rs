//! Text-generation ports used by the reasoning strategies.
//!
//! Two shapes are supported:
//!
//! - [`LlmClient`]: consumes role-tagged [`Message`]s (chain strategy).
//! - [`PromptClient`]: consumes one prompt string (tree strategy).
//!
//! [`UserPrompt`] adapts any `LlmClient` into a `PromptClient`. [`MockLlm`] implements both
//! with scripted responses for tests and demos.

mod mock;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;

pub use mock::{MockCall, MockLlm};

/// Token usage for one generation call (prompt + completion).
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl LlmUsage {
    pub fn add(&mut self, other: &LlmUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Generated text plus optional usage reported by the provider.
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    pub content: String,
    pub usage: Option<LlmUsage>,
}

impl LlmResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
        }
    }
}

/// Message-list generator: given a conversation, returns generated text.
///
/// Implementations own their latency and retry behaviour; strategies await each call before
/// issuing the next one and propagate any error unchanged.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;
}

/// Single-prompt generator: given one prompt string, returns generated text.
#[async_trait]
pub trait PromptClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AgentError>;
}

/// Exposes an [`LlmClient`] as a [`PromptClient`] by sending the prompt as one user message.
pub struct UserPrompt<L>(pub L);

#[async_trait]
impl<L: LlmClient> PromptClient for UserPrompt<L> {
    async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
        let response = self.0.invoke(&[Message::user(prompt)]).await?;
        Ok(response.content)
    }
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for std::sync::Arc<T> {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        (**self).invoke(messages).await
    }
}

#[async_trait]
impl<T: PromptClient + ?Sized> PromptClient for std::sync::Arc<T> {
    async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
        (**self).complete(prompt).await
    }
}
