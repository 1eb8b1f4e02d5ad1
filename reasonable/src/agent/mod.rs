//! Reasoning strategies: [`ChainReasoner`], [`TreeReasoner`] and [`ConsistencyAggregator`].
//!
//! Every strategy implements [`Reasoner`]: one `reason` call is one independent run that
//! builds its own thought log or tree and returns a [`RunResult`]. Generation errors abort the
//! run and propagate unchanged.

mod chain;
mod consistency;
mod tree;

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::message::Message;
use crate::tree::ThoughtRecord;

pub use chain::ChainReasoner;
pub use consistency::{ConsistencyAggregator, RunRow, RunsLog, NO_ANSWER};
pub use tree::{TreeReasoner, FINAL_ANSWER_MARKER, NO_CONFIDENT_ANSWER, ROOT_TEXT};

/// What a run reasons about: one free-text request or an existing conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReasonInput {
    Text(String),
    Conversation(Vec<Message>),
}

impl ReasonInput {
    /// Single text view: the request itself, or `role: content` lines for a conversation.
    pub fn as_question(&self) -> String {
        match self {
            ReasonInput::Text(text) => text.clone(),
            ReasonInput::Conversation(messages) => messages
                .iter()
                .map(|m| format!("{}: {}", m.role(), m.content()))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl From<&str> for ReasonInput {
    fn from(text: &str) -> Self {
        ReasonInput::Text(text.to_string())
    }
}

impl From<String> for ReasonInput {
    fn from(text: String) -> Self {
        ReasonInput::Text(text)
    }
}

impl From<Vec<Message>> for ReasonInput {
    fn from(messages: Vec<Message>) -> Self {
        ReasonInput::Conversation(messages)
    }
}

/// Thought record of one run: a linear log (chain) or a nested tree (tree).
///
/// Flattened into [`RunResult`] as `thoughts` or `thoughts_tree`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Thoughts {
    #[serde(rename = "thoughts")]
    Log(Vec<String>),
    #[serde(rename = "thoughts_tree")]
    Tree(ThoughtRecord),
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub answer: String,
    #[serde(flatten)]
    pub thoughts: Thoughts,
}

/// Outcome of a consistency aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Most frequent per-run answer, or [`NO_ANSWER`].
    pub answer: String,
    /// Thoughts of the first run whose answer won; `None` when no run produced one.
    pub thoughts: Option<Thoughts>,
}

/// A reasoning strategy. Each call is an independent run with no state shared with others.
#[async_trait]
pub trait Reasoner: Send + Sync {
    async fn reason(&self, input: &ReasonInput) -> Result<RunResult, AgentError>;
}

/// Closed set of strategies the aggregator can drive.
pub enum Strategy {
    Chain(ChainReasoner),
    Tree(TreeReasoner),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Chain(_) => "chain",
            Strategy::Tree(_) => "tree",
        }
    }
}

#[async_trait]
impl Reasoner for Strategy {
    async fn reason(&self, input: &ReasonInput) -> Result<RunResult, AgentError> {
        match self {
            Strategy::Chain(r) => r.reason(input).await,
            Strategy::Tree(r) => r.reason(input).await,
        }
    }
}

impl From<ChainReasoner> for Strategy {
    fn from(r: ChainReasoner) -> Self {
        Strategy::Chain(r)
    }
}

impl From<TreeReasoner> for Strategy {
    fn from(r: TreeReasoner) -> Self {
        Strategy::Tree(r)
    }
}

/// Snapshot locks only guard plain data, so a poisoned lock is still usable.
fn lock_snapshot<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
