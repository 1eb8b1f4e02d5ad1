//! Error types shared by the reasoning strategies.

use thiserror::Error;

/// Failure of a reasoning run.
///
/// Generation-capability failures are returned by [`LlmClient`](crate::LlmClient) /
/// [`PromptClient`](crate::PromptClient) implementations and pass through the strategies
/// unchanged; a failed call aborts the whole run.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The text generator failed (network, quota, provider error, ...).
    #[error("generation failed: {0}")]
    Generation(String),
    /// Internal execution failure (e.g. a broken tree invariant).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

/// Violation of a [`ThoughtTree`](crate::ThoughtTree) invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0} does not exist")]
    UnknownNode(usize),
    #[error("node {0} is terminal and cannot gain children")]
    TerminalNode(usize),
}

impl From<TreeError> for AgentError {
    fn from(e: TreeError) -> Self {
        AgentError::ExecutionFailed(e.to_string())
    }
}

/// Errors from writing a reasoning log.
#[derive(Debug, Error)]
pub enum LogError {
    /// The format selector is neither `json` nor `csv`. Raised before any file is created.
    #[error("unsupported log format {0:?}; use \"json\" or \"csv\"")]
    UnsupportedFormat(String),
    #[error("write log: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode json log: {0}")]
    Json(#[from] serde_json::Error),
    #[error("encode csv log: {0}")]
    Csv(#[from] csv::Error),
}
