//! Tagged-text protocol for chain steps.
//!
//! A step response is expected to look like:
//!
//! ```text
//! <reasoning>
//! ...free text...
//! </reasoning>
//! <next_action>
//! continue | final_answer
//! </next_action>
//! ```
//!
//! Tags match case-insensitively and may span lines. Missing tags never fail: the whole
//! text becomes the reasoning and the action defaults to [`CONTINUE`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Action assumed when the response carries no `<next_action>` tag.
pub const CONTINUE: &str = "continue";
/// Substring of the next action that ends the chain loop.
pub const FINAL_ANSWER: &str = "final_answer";

static REASONING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<reasoning>\s*(.*?)\s*</reasoning>").expect("valid regex"));
static NEXT_ACTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<next_action>\s*(.*?)\s*</next_action>").expect("valid regex"));

/// Reasoning segment and next-action signal extracted from one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStep {
    pub reasoning: String,
    pub next_action: String,
}

impl ParsedStep {
    /// True when the next action asks for the final answer (case-insensitive substring).
    pub fn wants_final_answer(&self) -> bool {
        self.next_action.to_lowercase().contains(FINAL_ANSWER)
    }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parses one generated block. Never fails.
pub fn parse_response(text: &str) -> ParsedStep {
    let reasoning = capture(&REASONING_RE, text).unwrap_or_else(|| text.to_string());
    let next_action = capture(&NEXT_ACTION_RE, text).unwrap_or_else(|| CONTINUE.to_string());
    tracing::debug!(%reasoning, %next_action, "parsed step");
    ParsedStep {
        reasoning,
        next_action,
    }
}
