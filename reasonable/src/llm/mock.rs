//! Scripted generator for tests and demos.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{LlmClient, LlmResponse, PromptClient};
use crate::error::AgentError;
use crate::message::Message;

/// One recorded call to [`MockLlm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Messages(Vec<Message>),
    Prompt(String),
}

#[derive(Debug, Default)]
struct Script {
    queue: VecDeque<String>,
    last: Option<String>,
    calls: Vec<MockCall>,
}

/// Mock generator implementing both [`LlmClient`] and [`PromptClient`].
///
/// Responses are served in order from one shared script regardless of shape; once the script
/// is exhausted the last response repeats. An empty script answers with an empty string.
/// [`MockLlm::failing`] builds a client whose every call fails.
#[derive(Debug, Default)]
pub struct MockLlm {
    script: Mutex<Script>,
    failure: Option<String>,
}

impl MockLlm {
    /// Always answers `content`.
    pub fn new(content: impl Into<String>) -> Self {
        Self::scripted([content.into()])
    }

    /// Answers each call with the next entry of `responses`.
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(Script {
                queue: responses.into_iter().map(Into::into).collect(),
                ..Script::default()
            }),
            failure: None,
        }
    }

    /// Every call returns [`AgentError::Generation`] with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: Mutex::default(),
            failure: Some(message.into()),
        }
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn respond(&self, call: MockCall) -> Result<String, AgentError> {
        let mut script = self.lock();
        script.calls.push(call);
        if let Some(message) = &self.failure {
            return Err(AgentError::Generation(message.clone()));
        }
        if let Some(next) = script.queue.pop_front() {
            script.last = Some(next.clone());
            return Ok(next);
        }
        Ok(script.last.clone().unwrap_or_default())
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let content = self.respond(MockCall::Messages(messages.to_vec()))?;
        Ok(LlmResponse::text(content))
    }
}

#[async_trait]
impl PromptClient for MockLlm {
    async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
        self.respond(MockCall::Prompt(prompt.to_string()))
    }
}
