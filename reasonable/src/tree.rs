//! Arena-backed thought tree used by the tree strategy.
//!
//! Nodes live in one `Vec` and are addressed by [`NodeId`]. Children are owned through
//! their ids in the parent's `children`; `parent` is a plain back-reference. Nodes are only
//! created by attaching them to an existing parent, so the tree is acyclic and every
//! non-root node has exactly one parent.

use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// Index of a node in its [`ThoughtTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub text: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Set when the node is terminal. A terminal node gains no further children.
    pub final_answer: Option<String>,
}

impl TreeNode {
    pub fn is_terminal(&self) -> bool {
        self.final_answer.as_deref().is_some_and(|a| !a.is_empty())
    }
}

/// Nested log record: `{thought, final_answer?, children?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThoughtRecord {
    pub thought: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ThoughtRecord>,
}

/// Flat log row in pre-order: `level, thought, final_answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeveledRow {
    pub level: usize,
    pub thought: String,
    pub final_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThoughtTree {
    nodes: Vec<TreeNode>,
}

impl ThoughtTree {
    /// Creates a tree holding only a root with `root_text`.
    pub fn new(root_text: impl Into<String>) -> Self {
        Self {
            nodes: vec![TreeNode {
                text: root_text.into(),
                parent: None,
                children: Vec::new(),
                final_answer: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Result<&TreeNode, TreeError> {
        self.nodes.get(id.0).ok_or(TreeError::UnknownNode(id.0))
    }

    /// Attaches a fresh child under `parent`. Fails when `parent` is terminal.
    pub fn add_child(&mut self, parent: NodeId, text: impl Into<String>) -> Result<NodeId, TreeError> {
        if self.node(parent)?.is_terminal() {
            return Err(TreeError::TerminalNode(parent.0));
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            text: text.into(),
            parent: Some(parent),
            children: Vec::new(),
            final_answer: None,
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Marks `id` terminal with `answer`.
    pub fn set_final_answer(&mut self, id: NodeId, answer: impl Into<String>) -> Result<(), TreeError> {
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or(TreeError::UnknownNode(id.0))?;
        node.final_answer = Some(answer.into());
        Ok(())
    }

    /// Nodes from the root down to `id`, both included.
    pub fn path(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut path = vec![id];
        let mut cur = self.node(id)?.parent;
        while let Some(p) = cur {
            path.push(p);
            cur = self.node(p)?.parent;
        }
        path.reverse();
        Ok(path)
    }

    /// Texts along the path from the root to `id`, root excluded.
    pub fn path_texts(&self, id: NodeId) -> Result<Vec<&str>, TreeError> {
        Ok(self
            .path(id)?
            .into_iter()
            .skip(1)
            .map(|n| self.nodes[n.0].text.as_str())
            .collect())
    }

    pub fn depth(&self, id: NodeId) -> Result<usize, TreeError> {
        Ok(self.path(id)?.len() - 1)
    }

    /// Pre-order walk from the root yielding `(id, level)`; children in insertion order.
    pub fn preorder(&self) -> Vec<(NodeId, usize)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root(), 0)];
        while let Some((id, level)) = stack.pop() {
            out.push((id, level));
            for child in self.nodes[id.0].children.iter().rev() {
                stack.push((*child, level + 1));
            }
        }
        out
    }

    /// Non-empty final answers in pre-order.
    pub fn final_answers(&self) -> Vec<&str> {
        self.preorder()
            .into_iter()
            .filter_map(|(id, _)| self.nodes[id.0].final_answer.as_deref())
            .filter(|a| !a.is_empty())
            .collect()
    }

    /// Nodes without children, in pre-order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .map(|(id, _)| id)
            .filter(|id| self.nodes[id.0].children.is_empty())
            .collect()
    }

    pub fn to_record(&self) -> ThoughtRecord {
        self.record_at(self.root())
    }

    fn record_at(&self, id: NodeId) -> ThoughtRecord {
        let node = &self.nodes[id.0];
        ThoughtRecord {
            thought: node.text.clone(),
            final_answer: node.final_answer.clone(),
            children: node.children.iter().map(|c| self.record_at(*c)).collect(),
        }
    }

    /// Rebuilds a tree from a nested record, preserving child order.
    pub fn from_record(record: &ThoughtRecord) -> Self {
        let mut tree = ThoughtTree::new(record.thought.clone());
        let mut stack = vec![(tree.root(), record)];
        while let Some((id, rec)) = stack.pop() {
            for child in &rec.children {
                let child_id = NodeId(tree.nodes.len());
                tree.nodes.push(TreeNode {
                    text: child.thought.clone(),
                    parent: Some(id),
                    children: Vec::new(),
                    final_answer: None,
                });
                tree.nodes[id.0].children.push(child_id);
                stack.push((child_id, child));
            }
            tree.nodes[id.0].final_answer = rec.final_answer.clone();
        }
        tree
    }

    pub fn rows(&self) -> Vec<LeveledRow> {
        self.preorder()
            .into_iter()
            .map(|(id, level)| {
                let node = &self.nodes[id.0];
                LeveledRow {
                    level,
                    thought: node.text.clone(),
                    final_answer: node.final_answer.clone().unwrap_or_default(),
                }
            })
            .collect()
    }

    /// Indented outline, four spaces per level, `- ` before non-root nodes.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (id, level) in self.preorder() {
            let node = &self.nodes[id.0];
            out.push_str(&"    ".repeat(level));
            if level > 0 {
                out.push_str("- ");
            }
            out.push_str(&node.text);
            if let Some(answer) = node.final_answer.as_deref().filter(|a| !a.is_empty()) {
                out.push_str(" -> [answer: ");
                out.push_str(answer);
                out.push(']');
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (ThoughtTree, NodeId, NodeId, NodeId) {
        let mut tree = ThoughtTree::new("root");
        let a = tree.add_child(tree.root(), "a").unwrap();
        let b = tree.add_child(tree.root(), "b").unwrap();
        let a1 = tree.add_child(a, "a1").unwrap();
        tree.set_final_answer(a1, "42").unwrap();
        (tree, a, b, a1)
    }

    #[test]
    fn path_runs_root_to_node() {
        let (tree, a, _, a1) = sample();
        assert_eq!(tree.path(a1).unwrap(), vec![tree.root(), a, a1]);
        assert_eq!(tree.path_texts(a1).unwrap(), vec!["a", "a1"]);
        assert_eq!(tree.depth(a1).unwrap(), 2);
        assert_eq!(tree.depth(tree.root()).unwrap(), 0);
    }

    #[test]
    fn terminal_node_rejects_children() {
        let (mut tree, _, _, a1) = sample();
        assert_eq!(tree.add_child(a1, "x"), Err(TreeError::TerminalNode(a1.index())));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn unknown_node_is_an_error() {
        let (tree, ..) = sample();
        assert_eq!(tree.node(NodeId(99)).unwrap_err(), TreeError::UnknownNode(99));
    }

    #[test]
    fn preorder_follows_insertion_order() {
        let (tree, ..) = sample();
        let texts: Vec<_> = tree
            .preorder()
            .into_iter()
            .map(|(id, level)| (tree.node(id).unwrap().text.clone(), level))
            .collect();
        assert_eq!(
            texts,
            vec![
                ("root".to_string(), 0),
                ("a".to_string(), 1),
                ("a1".to_string(), 2),
                ("b".to_string(), 1)
            ]
        );
        assert_eq!(tree.final_answers(), vec!["42"]);
        assert_eq!(tree.leaves().len(), 2);
    }

    #[test]
    fn record_skips_empty_fields() {
        let (tree, ..) = sample();
        let json = serde_json::to_value(tree.to_record()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "thought": "root",
                "children": [
                    {"thought": "a", "children": [{"thought": "a1", "final_answer": "42"}]},
                    {"thought": "b"}
                ]
            })
        );
    }

    #[test]
    fn record_rebuilds_identical_tree() {
        let (tree, ..) = sample();
        let record = tree.to_record();
        let text = serde_json::to_string(&record).unwrap();
        let parsed: ThoughtRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(ThoughtTree::from_record(&parsed).to_record(), record);
    }

    #[test]
    fn rows_and_render() {
        let (tree, ..) = sample();
        let rows = tree.rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2].level, 2);
        assert_eq!(rows[2].final_answer, "42");
        assert_eq!(rows[3].final_answer, "");
        assert_eq!(
            tree.render(),
            "root\n    - a\n        - a1 -> [answer: 42]\n    - b\n"
        );
    }
}
