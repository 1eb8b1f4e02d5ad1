//! # Reasonable
//!
//! Multi-step reasoning on top of any text generator. The crate never produces knowledge
//! itself: it structures calls to an opaque generator, manages step and depth budgets, and
//! picks the answer.
//!
//! ## Strategies
//!
//! - [`ChainReasoner`]: repeated "next thought" calls until the model signals
//!   `final_answer` or the step budget runs out, then one final-answer call.
//! - [`TreeReasoner`]: depth-bounded branching into several continuations per node; the
//!   first final answer in pre-order wins.
//! - [`ConsistencyAggregator`]: runs a strategy N times and keeps the most frequent answer.
//!
//! All three implement [`Reasoner`]. Chain steps speak a tagged protocol
//! (`<reasoning>` / `<next_action>`) parsed leniently by [`parse_response`].
//!
//! ## Main modules
//!
//! - [`llm`]: [`LlmClient`] (message list), [`PromptClient`] (single prompt), [`MockLlm`].
//! - [`agent`]: the strategies, [`ReasonInput`], [`RunResult`], [`AggregateResult`].
//! - [`tree`]: [`ThoughtTree`] arena, nested [`ThoughtRecord`] and flat [`LeveledRow`].
//! - [`prompts`]: templates embedded from `prompts/*.yaml`, overridable per directory.
//! - [`export`]: JSON / CSV reasoning logs.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use reasonable::{ChainReasoner, LlmClient, MockLlm, ReasonInput, Reasoner};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let llm: Arc<dyn LlmClient> = Arc::new(MockLlm::scripted([
//!     "<reasoning>2 + 2 = 4</reasoning><next_action>final_answer</next_action>",
//!     "4",
//! ]));
//! let chain = ChainReasoner::new(llm).with_max_steps(3);
//! let run = chain.reason(&ReasonInput::from("What is 2+2?")).await.unwrap();
//! assert_eq!(run.answer, "4");
//! # }
//! ```

pub mod agent;
pub mod error;
pub mod export;
pub mod llm;
pub mod message;
pub mod parser;
pub mod prompts;
pub mod tree;

pub use agent::{
    AggregateResult, ChainReasoner, ConsistencyAggregator, ReasonInput, Reasoner, RunResult,
    RunRow, RunsLog, Strategy, Thoughts, TreeReasoner, FINAL_ANSWER_MARKER, NO_ANSWER,
    NO_CONFIDENT_ANSWER, ROOT_TEXT,
};
pub use env_config::ReasonerSettings;
pub use error::{AgentError, LogError, TreeError};
pub use export::LogFormat;
pub use llm::{LlmClient, LlmResponse, LlmUsage, MockCall, MockLlm, PromptClient, UserPrompt};
pub use message::Message;
pub use parser::{parse_response, ParsedStep};
pub use prompts::{AgentPrompts, ChainPrompts, LoadError as PromptsLoadError, TreePrompts};
pub use tree::{LeveledRow, NodeId, ThoughtRecord, ThoughtTree, TreeNode};
