//! Prompt templates for the chain and tree strategies.
//!
//! Templates are plain values handed to each reasoner at construction; nothing here is
//! process-global. Defaults come from the embedded `reasonable/prompts/*.yaml`; [`load`]
//! overlays a directory of the same files on top.

mod load;

use serde::{Deserialize, Serialize};

pub use load::{default_from_embedded, load, load_or_default, LoadError};

/// Instructions for the two chain phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainPrompts {
    /// System message for every reasoning step.
    pub reasoning: String,
    /// System message for the closing final-answer call.
    pub final_answer: String,
}

/// Templates for the tree strategy; `{question}` and `{thoughts}` are substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreePrompts {
    pub thought: String,
    pub final_answer: String,
}

impl TreePrompts {
    pub fn render_thought(&self, question: &str, thoughts: &[&str]) -> String {
        fill(&self.thought, question, thoughts)
    }

    pub fn render_final(&self, question: &str, thoughts: &[&str]) -> String {
        fill(&self.final_answer, question, thoughts)
    }
}

/// All templates, as resolved from embedded defaults and optional overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPrompts {
    pub chain: ChainPrompts,
    pub tree: TreePrompts,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        default_from_embedded()
    }
}

impl Default for ChainPrompts {
    fn default() -> Self {
        default_from_embedded().chain
    }
}

impl Default for TreePrompts {
    fn default() -> Self {
        default_from_embedded().tree
    }
}

/// Single pass substitution so placeholder text inside the question or thoughts is left alone.
fn fill(template: &str, question: &str, thoughts: &[&str]) -> String {
    let thoughts = thoughts.join("\n");
    let mut out = String::with_capacity(template.len() + question.len() + thoughts.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{question}") {
            out.push_str(question);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{thoughts}") {
            out.push_str(&thoughts);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}
