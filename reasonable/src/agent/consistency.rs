//! Self-consistency: run a strategy N times and keep the most frequent answer.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use env_config::ReasonerSettings;
use serde::{Deserialize, Serialize};

use super::{lock_snapshot, AggregateResult, ChainReasoner, ReasonInput, Reasoner, RunResult, Strategy, Thoughts};
use crate::error::{AgentError, LogError};
use crate::export::{self, LogFormat};
use crate::llm::LlmClient;

/// Answer reported when no run produced an answer (e.g. zero runs).
pub const NO_ANSWER: &str = "no answer";

/// Nested log of one aggregation: `{"runs": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunsLog {
    pub runs: Vec<RunResult>,
}

/// Flat log row: `run_index` (1-based), `answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRow {
    pub run_index: usize,
    pub answer: String,
}

impl RunsLog {
    pub fn rows(&self) -> Vec<RunRow> {
        self.runs
            .iter()
            .enumerate()
            .map(|(i, run)| RunRow {
                run_index: i + 1,
                answer: run.answer.clone(),
            })
            .collect()
    }
}

/// Most frequent answer; ties go to the answer seen first.
pub(crate) fn most_frequent<'a>(answers: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for answer in answers {
        match index.get(answer) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(answer, order.len());
                order.push((answer, 1));
            }
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (answer, count) in order {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((answer, count));
        }
    }
    best.map(|(answer, _)| answer)
}

/// Runs an inner [`Reasoner`] `num_runs` times on the same input and returns the mode of the
/// answers plus the thoughts of the first run that gave it.
///
/// Runs are sequential by default. With [`concurrent`](Self::concurrent) they are awaited
/// together but results keep run order, so the chosen thoughts do not change.
pub struct ConsistencyAggregator<R = Strategy> {
    inner: R,
    num_runs: u32,
    concurrent: bool,
    last_runs: Mutex<Vec<RunResult>>,
}

impl ConsistencyAggregator<Strategy> {
    /// Aggregates the chain strategy with default settings.
    pub fn with_chain(llm: Arc<dyn LlmClient>, num_runs: u32) -> Self {
        Self::new(Strategy::Chain(ChainReasoner::new(llm)), num_runs)
    }

    /// Chain strategy and run count taken from `settings`.
    pub fn from_settings(llm: Arc<dyn LlmClient>, settings: &ReasonerSettings) -> Self {
        Self::new(
            Strategy::Chain(ChainReasoner::from_settings(llm, settings)),
            settings.num_runs,
        )
    }
}

impl<R: Reasoner> ConsistencyAggregator<R> {
    pub fn new(inner: R, num_runs: u32) -> Self {
        Self {
            inner,
            num_runs,
            concurrent: false,
            last_runs: Mutex::new(Vec::new()),
        }
    }

    pub fn concurrent(mut self, enabled: bool) -> Self {
        self.concurrent = enabled;
        self
    }

    pub fn num_runs(&self) -> u32 {
        self.num_runs
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Per-run results of the last successful aggregation, in run order.
    pub fn last_runs(&self) -> Vec<RunResult> {
        lock_snapshot(&self.last_runs).clone()
    }

    /// Writes the last runs as `json` (`{"runs": [...]}`) or `csv` (`run_index, answer`).
    pub fn save_log(&self, path: impl AsRef<Path>, format: &str) -> Result<(), LogError> {
        let format: LogFormat = format.parse()?;
        let log = RunsLog {
            runs: self.last_runs(),
        };
        export::write_runs_log(path.as_ref(), &log, format)
    }

    async fn run_all(&self, input: &ReasonInput) -> Result<Vec<RunResult>, AgentError> {
        if self.concurrent {
            return futures::future::try_join_all((0..self.num_runs).map(|_| self.inner.reason(input))).await;
        }
        let mut runs = Vec::with_capacity(self.num_runs as usize);
        for run in 0..self.num_runs {
            let result = self.inner.reason(input).await?;
            tracing::debug!(run, answer = %result.answer, "consistency run finished");
            runs.push(result);
        }
        Ok(runs)
    }

    pub async fn aggregate(&self, input: &ReasonInput) -> Result<AggregateResult, AgentError> {
        tracing::info!(strategy = "consistency", num_runs = self.num_runs, "run started");
        let runs = self.run_all(input).await?;

        let result = match most_frequent(runs.iter().map(|r| r.answer.as_str())) {
            Some(best) => AggregateResult {
                answer: best.to_string(),
                thoughts: runs.iter().find(|r| r.answer == best).map(|r| r.thoughts.clone()),
            },
            None => AggregateResult {
                answer: NO_ANSWER.to_string(),
                thoughts: None,
            },
        };
        tracing::info!(strategy = "consistency", runs = runs.len(), answer = %result.answer, "run finished");

        *lock_snapshot(&self.last_runs) = runs;
        Ok(result)
    }
}

#[async_trait]
impl<R: Reasoner> Reasoner for ConsistencyAggregator<R> {
    async fn reason(&self, input: &ReasonInput) -> Result<RunResult, AgentError> {
        let aggregate = self.aggregate(input).await?;
        Ok(RunResult {
            answer: aggregate.answer,
            thoughts: aggregate.thoughts.unwrap_or(Thoughts::Log(Vec::new())),
        })
    }
}
