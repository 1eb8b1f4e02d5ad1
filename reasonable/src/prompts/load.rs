//! Load prompt templates from a directory of YAML files.
//!
//! Default text lives in `reasonable/prompts/*.yaml` and is embedded at compile time. A
//! directory may override any subset of fields; missing files and missing fields keep the
//! embedded value.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{AgentPrompts, ChainPrompts, TreePrompts};

macro_rules! embed_prompt_yaml {
    ($name:literal) => {
        include_str!(concat!("../../prompts/", $name))
    };
}
const EMBED_CHAIN: &str = embed_prompt_yaml!("chain.yaml");
const EMBED_TREE: &str = embed_prompt_yaml!("tree.yaml");

const CHAIN_FILE: &str = "chain.yaml";
const TREE_FILE: &str = "tree.yaml";

/// Directory used when neither an explicit dir nor `PROMPTS_DIR` is given.
const DEFAULT_PROMPTS_DIR: &str = "prompts";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("prompts directory not found or not readable: {0}")]
    DirNotFound(String),
    #[error("failed to read prompts file {path}: {message}")]
    ReadFile { path: String, message: String },
    #[error("failed to parse YAML in {path}: {message}")]
    ParseYaml { path: String, message: String },
}

#[derive(Debug, Default, Deserialize)]
struct ChainPromptsFile {
    #[serde(default)]
    reasoning_prompt: Option<String>,
    #[serde(default)]
    final_answer_prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TreePromptsFile {
    #[serde(default)]
    thought_prompt: Option<String>,
    #[serde(default)]
    final_prompt: Option<String>,
}

fn prompts_dir(dir: Option<&Path>) -> PathBuf {
    dir.map(Path::to_path_buf).unwrap_or_else(|| {
        std::env::var_os("PROMPTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPTS_DIR))
    })
}

/// `Ok(None)` when the file does not exist.
fn read_yaml_file<T>(dir: &Path, name: &str) -> Result<Option<T>, LoadError>
where
    T: for<'de> Deserialize<'de>,
{
    let path = dir.join(name);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(LoadError::ReadFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        }
    };
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| LoadError::ParseYaml {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

fn overlay_chain(base: ChainPrompts, file: ChainPromptsFile) -> ChainPrompts {
    ChainPrompts {
        reasoning: file.reasoning_prompt.unwrap_or(base.reasoning),
        final_answer: file.final_answer_prompt.unwrap_or(base.final_answer),
    }
}

fn overlay_tree(base: TreePrompts, file: TreePromptsFile) -> TreePrompts {
    TreePrompts {
        thought: file.thought_prompt.unwrap_or(base.thought),
        final_answer: file.final_prompt.unwrap_or(base.final_answer),
    }
}

/// Prompts parsed from the embedded YAML.
pub fn default_from_embedded() -> AgentPrompts {
    let chain: ChainPromptsFile = serde_yaml::from_str(EMBED_CHAIN).unwrap_or_default();
    let tree: TreePromptsFile = serde_yaml::from_str(EMBED_TREE).unwrap_or_default();
    AgentPrompts {
        chain: ChainPrompts {
            reasoning: chain.reasoning_prompt.unwrap_or_default(),
            final_answer: chain.final_answer_prompt.unwrap_or_default(),
        },
        tree: TreePrompts {
            thought: tree.thought_prompt.unwrap_or_default(),
            final_answer: tree.final_prompt.unwrap_or_default(),
        },
    }
}

/// Loads `chain.yaml` / `tree.yaml` from `dir` (else `PROMPTS_DIR`, else `./prompts`) over the
/// embedded defaults. Errors when the directory is missing or a present file fails to parse.
pub fn load(dir: Option<&Path>) -> Result<AgentPrompts, LoadError> {
    let base = prompts_dir(dir);
    if !base.is_dir() {
        return Err(LoadError::DirNotFound(base.display().to_string()));
    }
    let defaults = default_from_embedded();
    let chain = read_yaml_file::<ChainPromptsFile>(&base, CHAIN_FILE)?.unwrap_or_default();
    let tree = read_yaml_file::<TreePromptsFile>(&base, TREE_FILE)?.unwrap_or_default();
    Ok(AgentPrompts {
        chain: overlay_chain(defaults.chain, chain),
        tree: overlay_tree(defaults.tree, tree),
    })
}

/// [`load`], falling back to the embedded defaults on any error.
pub fn load_or_default(dir: Option<&Path>) -> AgentPrompts {
    load(dir).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "using embedded prompts");
        default_from_embedded()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_are_complete() {
        let p = default_from_embedded();
        assert!(p.chain.reasoning.contains("<reasoning>"));
        assert!(p.chain.final_answer.contains("DO NOT USE ANY TAGS"));
        assert!(p.tree.thought.contains("{question}"));
        assert!(p.tree.final_answer.contains("{thoughts}"));
    }

    #[test]
    fn missing_dir_is_an_error() {
        let err = load(Some(Path::new("/nonexistent_prompts_dir_12345"))).unwrap_err();
        assert!(matches!(err, LoadError::DirNotFound(_)));
        assert_eq!(
            load_or_default(Some(Path::new("/nonexistent_prompts_dir_12345"))),
            default_from_embedded()
        );
    }

    #[test]
    fn partial_file_overrides_one_field() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join(CHAIN_FILE), "final_answer_prompt: \"Answer now.\"\n").unwrap();
        let p = load(Some(temp.path())).unwrap();
        let defaults = default_from_embedded();
        assert_eq!(p.chain.final_answer, "Answer now.");
        assert_eq!(p.chain.reasoning, defaults.chain.reasoning);
        assert_eq!(p.tree, defaults.tree);
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join(TREE_FILE), "thought_prompt: [not closed").unwrap();
        let err = load(Some(temp.path())).unwrap_err();
        assert!(matches!(err, LoadError::ParseYaml { .. }));
    }

    #[test]
    fn empty_dir_keeps_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        assert_eq!(load(Some(temp.path())).unwrap(), default_from_embedded());
    }
}
