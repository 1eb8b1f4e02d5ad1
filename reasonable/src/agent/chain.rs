//! Chain strategy: a bounded loop of "next thought" calls followed by one final-answer call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use env_config::ReasonerSettings;

use super::{ReasonInput, Reasoner, RunResult, Thoughts};
use crate::error::AgentError;
use crate::llm::{LlmClient, LlmUsage};
use crate::message::Message;
use crate::parser::parse_response;
use crate::prompts::ChainPrompts;

/// Renders the running thought log; empty logs render as an empty tag pair.
pub(crate) fn render_previous_thoughts(thoughts: &[String]) -> String {
    if thoughts.is_empty() {
        "<previous_thoughts></previous_thoughts>".to_string()
    } else {
        format!("<previous_thoughts>\n{}\n</previous_thoughts>", thoughts.join("\n"))
    }
}

fn render_request(request: &str, thoughts: &[String]) -> String {
    format!(
        "<user_request>\n{request}\n</user_request>\n{}",
        render_previous_thoughts(thoughts)
    )
}

/// Chain-of-thought reasoner.
///
/// Each step sends `[system: reasoning prompt] + context + [user: previous thoughts]`, parses
/// the reply and appends its reasoning to the log. The loop stops after the step whose next
/// action contains `final_answer`, or after `max_steps` steps; the last thought is always kept.
/// A final call with `[system: final-answer prompt] + [user: previous thoughts]` produces the
/// answer, returned verbatim.
pub struct ChainReasoner {
    llm: Arc<dyn LlmClient>,
    answer_llm: Arc<dyn LlmClient>,
    max_steps: u32,
    step_delay: Option<Duration>,
    prompts: ChainPrompts,
}

impl ChainReasoner {
    /// Uses `llm` for both phases, 10 steps, no delay and the embedded prompts.
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            answer_llm: Arc::clone(&llm),
            llm,
            max_steps: ReasonerSettings::default().max_steps,
            step_delay: None,
            prompts: ChainPrompts::default(),
        }
    }

    /// Budgets and pacing from `settings`.
    pub fn from_settings(llm: Arc<dyn LlmClient>, settings: &ReasonerSettings) -> Self {
        Self::new(llm)
            .with_max_steps(settings.max_steps)
            .with_step_delay(settings.step_delay())
    }

    /// Separate client for the final-answer call.
    pub fn with_answer_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.answer_llm = llm;
        self
    }

    /// Step budget, at least 1.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Pause after each step that does not end the loop, and before the final call.
    pub fn with_step_delay(mut self, delay: Option<Duration>) -> Self {
        self.step_delay = delay.filter(|d| !d.is_zero());
        self
    }

    pub fn with_prompts(mut self, prompts: ChainPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    fn step_messages(&self, input: &ReasonInput, thoughts: &[String]) -> Vec<Message> {
        let system = Message::system(self.prompts.reasoning.clone());
        match input {
            ReasonInput::Text(request) => vec![system, Message::user(render_request(request, thoughts))],
            ReasonInput::Conversation(history) => {
                let mut messages = Vec::with_capacity(history.len() + 2);
                messages.push(system);
                messages.extend(history.iter().cloned());
                messages.push(Message::user(render_previous_thoughts(thoughts)));
                messages
            }
        }
    }

    /// Text input rebuilds the list; a conversation only replaces its trailing thoughts message.
    fn refresh_messages(&self, messages: &mut Vec<Message>, input: &ReasonInput, thoughts: &[String]) {
        match input {
            ReasonInput::Text(_) => *messages = self.step_messages(input, thoughts),
            ReasonInput::Conversation(_) => {
                if let Some(last) = messages.last_mut() {
                    *last = Message::user(render_previous_thoughts(thoughts));
                }
            }
        }
    }

    fn final_messages(&self, input: &ReasonInput, thoughts: &[String]) -> Vec<Message> {
        let user = match input {
            ReasonInput::Text(request) => render_request(request, thoughts),
            ReasonInput::Conversation(_) => render_previous_thoughts(thoughts),
        };
        vec![
            Message::system(self.prompts.final_answer.clone()),
            Message::user(user),
        ]
    }

    async fn pause(&self) {
        if let Some(delay) = self.step_delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Reasoner for ChainReasoner {
    async fn reason(&self, input: &ReasonInput) -> Result<RunResult, AgentError> {
        tracing::info!(strategy = "chain", max_steps = self.max_steps, "run started");
        let mut usage = LlmUsage::default();
        let mut thoughts: Vec<String> = Vec::new();
        let mut messages = self.step_messages(input, &thoughts);

        for step in 0..self.max_steps {
            let response = self.llm.invoke(&messages).await?;
            if let Some(u) = &response.usage {
                usage.add(u);
            }
            let parsed = parse_response(&response.content);
            let done = parsed.wants_final_answer();
            thoughts.push(parsed.reasoning);
            tracing::debug!(step, done, "chain step");

            if done || step + 1 == self.max_steps {
                break;
            }
            self.refresh_messages(&mut messages, input, &thoughts);
            self.pause().await;
        }

        let final_messages = self.final_messages(input, &thoughts);
        self.pause().await;
        let response = self.answer_llm.invoke(&final_messages).await?;
        if let Some(u) = &response.usage {
            usage.add(u);
        }

        tracing::info!(
            strategy = "chain",
            steps = thoughts.len(),
            total_tokens = usage.total_tokens,
            "run finished"
        );
        Ok(RunResult {
            answer: response.content,
            thoughts: Thoughts::Log(thoughts),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_thoughts_rendering() {
        assert_eq!(render_previous_thoughts(&[]), "<previous_thoughts></previous_thoughts>");
        assert_eq!(
            render_previous_thoughts(&["a".to_string(), "b".to_string()]),
            "<previous_thoughts>\na\nb\n</previous_thoughts>"
        );
        assert_eq!(
            render_request("2+2?", &[]),
            "<user_request>\n2+2?\n</user_request>\n<previous_thoughts></previous_thoughts>"
        );
    }

    #[test]
    fn budgets_are_clamped() {
        let llm: Arc<dyn LlmClient> = Arc::new(crate::MockLlm::new("x"));
        assert_eq!(ChainReasoner::new(Arc::clone(&llm)).with_max_steps(0).max_steps(), 1);
        let settings = ReasonerSettings {
            max_steps: 3,
            step_delay_ms: 0,
            ..ReasonerSettings::default()
        };
        let r = ChainReasoner::from_settings(llm, &settings);
        assert_eq!(r.max_steps(), 3);
        assert!(r.step_delay.is_none());
    }
}
