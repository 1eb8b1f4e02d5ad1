//! Tree strategy: depth-bounded branching over single-prompt generation calls.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use env_config::ReasonerSettings;

use super::{lock_snapshot, ReasonInput, Reasoner, RunResult, Thoughts};
use crate::error::{AgentError, LogError};
use crate::export::{self, LogFormat};
use crate::llm::PromptClient;
use crate::prompts::TreePrompts;
use crate::tree::{NodeId, ThoughtTree};

/// Text of every root node. Not rendered into prompts.
pub const ROOT_TEXT: &str = "Start of reasoning";
/// A branch response containing this marker ends reasoning at its parent node.
pub const FINAL_ANSWER_MARKER: &str = "FINAL_ANSWER";
/// Answer reported when no node in the tree carries a final answer.
pub const NO_CONFIDENT_ANSWER: &str = "no confident answer found";

const MARKER_DELIMITER: &str = "FINAL_ANSWER:";

/// Answer carried by a branch response, if it has the marker: the text after the last
/// `FINAL_ANSWER:`, or the whole response when only the bare marker is present.
fn marker_answer(response: &str) -> Option<&str> {
    if !response.contains(FINAL_ANSWER_MARKER) {
        return None;
    }
    let answer = response
        .rsplit_once(MARKER_DELIMITER)
        .map_or(response, |(_, after)| after);
    Some(answer.trim())
}

/// Tree-of-thought reasoner.
///
/// Nodes shallower than `max_depth` ask for up to `branch_factor` continuations, one call each.
/// The first continuation carrying the final-answer marker makes the node itself terminal
/// and skips its remaining branches, so `branch_factor` is an upper bound. Nodes at
/// `max_depth` get one final-answer call. Expansion is depth first in insertion order; the
/// reported answer is the first final answer found in pre-order.
pub struct TreeReasoner {
    llm: Arc<dyn PromptClient>,
    max_depth: u32,
    branch_factor: u32,
    prompts: TreePrompts,
    last_tree: Mutex<Option<ThoughtTree>>,
}

impl TreeReasoner {
    /// Depth 5, three branches, embedded prompts.
    pub fn new(llm: Arc<dyn PromptClient>) -> Self {
        let defaults = ReasonerSettings::default();
        Self {
            llm,
            max_depth: defaults.max_depth,
            branch_factor: defaults.branch_factor,
            prompts: TreePrompts::default(),
            last_tree: Mutex::new(None),
        }
    }

    pub fn from_settings(llm: Arc<dyn PromptClient>, settings: &ReasonerSettings) -> Self {
        Self::new(llm)
            .with_max_depth(settings.max_depth)
            .with_branch_factor(settings.branch_factor)
    }

    /// Depth bound, at least 1.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Continuations per node, at least 1.
    pub fn with_branch_factor(mut self, branch_factor: u32) -> Self {
        self.branch_factor = branch_factor.max(1);
        self
    }

    pub fn with_prompts(mut self, prompts: TreePrompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn branch_factor(&self) -> u32 {
        self.branch_factor
    }

    /// Tree of the last successful run.
    pub fn last_tree(&self) -> Option<ThoughtTree> {
        lock_snapshot(&self.last_tree).clone()
    }

    /// Outline of the last tree, or a placeholder line when there is none.
    pub fn visualize(&self) -> String {
        match lock_snapshot(&self.last_tree).as_ref() {
            Some(tree) => tree.render(),
            None => "thought tree is empty\n".to_string(),
        }
    }

    /// Writes the last tree as `json` (nested) or `csv` (leveled rows).
    pub fn save_log(&self, path: impl AsRef<Path>, format: &str) -> Result<(), LogError> {
        let format: LogFormat = format.parse()?;
        let snapshot = lock_snapshot(&self.last_tree);
        export::write_tree_log(path.as_ref(), snapshot.as_ref(), format)
    }

    /// Expands the whole tree for `question` with an explicit stack of `(node, depth)`.
    async fn grow(&self, question: &str) -> Result<ThoughtTree, AgentError> {
        let mut tree = ThoughtTree::new(ROOT_TEXT);
        let mut pending: Vec<(NodeId, u32)> = vec![(tree.root(), 0)];

        while let Some((node, depth)) = pending.pop() {
            if tree.node(node)?.is_terminal() {
                continue;
            }

            if depth >= self.max_depth {
                let prompt = self.prompts.render_final(question, &tree.path_texts(node)?);
                let answer = self.llm.complete(&prompt).await?;
                let answer = answer.trim();
                tracing::debug!(node = node.index(), depth, %answer, "depth bound answer");
                tree.set_final_answer(node, answer)?;
                continue;
            }

            let prompt = self.prompts.render_thought(question, &tree.path_texts(node)?);
            let mut children = Vec::with_capacity(self.branch_factor as usize);
            let mut concluded = false;
            for branch in 0..self.branch_factor {
                let response = self.llm.complete(&prompt).await?;
                let response = response.trim();
                if let Some(answer) = marker_answer(response) {
                    tracing::debug!(node = node.index(), depth, branch, %answer, "early final answer");
                    tree.set_final_answer(node, answer)?;
                    concluded = true;
                    break;
                }
                tracing::debug!(node = node.index(), depth, branch, "branch added");
                children.push(tree.add_child(node, response)?);
            }
            if concluded {
                continue;
            }
            // Reverse so the first child is expanded first.
            pending.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
        }

        Ok(tree)
    }
}

#[async_trait]
impl Reasoner for TreeReasoner {
    async fn reason(&self, input: &ReasonInput) -> Result<RunResult, AgentError> {
        tracing::info!(
            strategy = "tree",
            max_depth = self.max_depth,
            branch_factor = self.branch_factor,
            "run started"
        );
        let question = input.as_question();
        let tree = self.grow(&question).await?;

        let answer = match tree.final_answers().first() {
            Some(a) => a.to_string(),
            None => {
                tracing::warn!(nodes = tree.len(), "tree produced no final answer");
                NO_CONFIDENT_ANSWER.to_string()
            }
        };
        let record = tree.to_record();
        tracing::info!(strategy = "tree", nodes = tree.len(), %answer, "run finished");
        *lock_snapshot(&self.last_tree) = Some(tree);

        Ok(RunResult {
            answer,
            thoughts: Thoughts::Tree(record),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_answer_takes_text_after_last_delimiter() {
        assert_eq!(marker_answer("so FINAL_ANSWER: 4"), Some("4"));
        assert_eq!(marker_answer("FINAL_ANSWER: 3 FINAL_ANSWER:  5 "), Some("5"));
        assert_eq!(marker_answer("FINAL_ANSWER without colon"), Some("FINAL_ANSWER without colon"));
        assert_eq!(marker_answer("final_answer: lowercase is a thought"), None);
        assert_eq!(marker_answer("keep going"), None);
    }

    #[test]
    fn bounds_are_clamped() {
        let llm: Arc<dyn PromptClient> = Arc::new(crate::MockLlm::new("x"));
        let r = TreeReasoner::new(llm).with_max_depth(0).with_branch_factor(0);
        assert_eq!(r.max_depth(), 1);
        assert_eq!(r.branch_factor(), 1);
        assert_eq!(r.visualize(), "thought tree is empty\n");
        assert!(r.last_tree().is_none());
    }
}
