//! Consistency aggregation: mode selection, tie-breaking, sentinel, inner strategies.

mod init_logging;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reasonable::{
    AgentError, ChainReasoner, ConsistencyAggregator, MockLlm, ReasonInput, Reasoner, RunResult,
    Strategy, Thoughts, TreeReasoner, NO_ANSWER,
};

/// Answers run `i` with `answers[i]` and records the input it saw.
struct FixedAnswers {
    answers: Vec<&'static str>,
    next: AtomicUsize,
}

impl FixedAnswers {
    fn new(answers: &[&'static str]) -> Self {
        Self {
            answers: answers.to_vec(),
            next: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Reasoner for FixedAnswers {
    async fn reason(&self, _input: &ReasonInput) -> Result<RunResult, AgentError> {
        let i = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(RunResult {
            answer: self.answers[i % self.answers.len()].to_string(),
            thoughts: Thoughts::Log(vec![format!("run {}", i + 1)]),
        })
    }
}

fn chain_script(answers: &[&str]) -> Vec<String> {
    answers
        .iter()
        .enumerate()
        .flat_map(|(i, a)| {
            [
                format!("<reasoning>r{}</reasoning><next_action>final_answer</next_action>", i + 1),
                a.to_string(),
            ]
        })
        .collect()
}

#[tokio::test]
async fn most_frequent_answer_wins_with_first_matching_thoughts() {
    let mock = Arc::new(MockLlm::scripted(chain_script(&["A", "B", "A", "A", "C"])));
    let chain = ChainReasoner::new(mock.clone()).with_max_steps(1);
    let aggregator = ConsistencyAggregator::new(Strategy::Chain(chain), 5);

    let result = aggregator.aggregate(&"question".into()).await.unwrap();

    assert_eq!(result.answer, "A");
    assert_eq!(result.thoughts, Some(Thoughts::Log(vec!["r1".to_string()])));
    assert_eq!(mock.call_count(), 10);
    let answers: Vec<_> = aggregator.last_runs().into_iter().map(|r| r.answer).collect();
    assert_eq!(answers, ["A", "B", "A", "A", "C"]);
}

#[tokio::test]
async fn ties_go_to_first_encountered_answer() {
    let aggregator = ConsistencyAggregator::new(FixedAnswers::new(&["B", "A", "A", "B"]), 4);

    let result = aggregator.aggregate(&"q".into()).await.unwrap();

    assert_eq!(result.answer, "B");
    assert_eq!(result.thoughts, Some(Thoughts::Log(vec!["run 1".to_string()])));
}

#[tokio::test]
async fn thoughts_come_from_first_run_with_winning_answer() {
    let aggregator = ConsistencyAggregator::new(FixedAnswers::new(&["x", "y", "y"]), 3);

    let result = aggregator.aggregate(&"q".into()).await.unwrap();

    assert_eq!(result.answer, "y");
    assert_eq!(result.thoughts, Some(Thoughts::Log(vec!["run 2".to_string()])));
}

#[tokio::test]
async fn reported_answer_is_always_a_run_answer() {
    let cases: [&[&'static str]; 4] = [&["a"], &["a", "b"], &["b", "a", "b"], &["c", "c", "d", "d", "d"]];
    for answers in cases {
        let aggregator =
            ConsistencyAggregator::new(FixedAnswers::new(answers), answers.len() as u32);
        let result = aggregator.aggregate(&"q".into()).await.unwrap();
        assert!(answers.contains(&result.answer.as_str()));
    }
}

#[tokio::test]
async fn zero_runs_yield_sentinel_without_calls() {
    let mock = Arc::new(MockLlm::new("unused"));
    let aggregator = ConsistencyAggregator::with_chain(mock.clone(), 0);

    let result = aggregator.aggregate(&"q".into()).await.unwrap();

    assert_eq!(result.answer, NO_ANSWER);
    assert!(result.thoughts.is_none());
    assert_eq!(mock.call_count(), 0);
    assert!(aggregator.last_runs().is_empty());
}

#[tokio::test]
async fn tree_strategy_runs_are_independent() {
    let mock = Arc::new(MockLlm::scripted([
        "FINAL_ANSWER: 9",
        "FINAL_ANSWER: 8",
        "FINAL_ANSWER: 9",
    ]));
    let tree = TreeReasoner::new(mock.clone()).with_max_depth(2).with_branch_factor(2);
    let aggregator = ConsistencyAggregator::new(Strategy::from(tree), 3);

    let result = aggregator.aggregate(&"q".into()).await.unwrap();

    assert_eq!(result.answer, "9");
    assert_eq!(mock.call_count(), 3);
    match result.thoughts {
        Some(Thoughts::Tree(record)) => assert_eq!(record.final_answer.as_deref(), Some("9")),
        other => panic!("expected tree thoughts, got {other:?}"),
    }
    assert_eq!(aggregator.inner().name(), "tree");
}

#[tokio::test]
async fn concurrent_runs_keep_run_order() {
    let aggregator =
        ConsistencyAggregator::new(FixedAnswers::new(&["p", "q", "q", "p", "r"]), 5).concurrent(true);

    let result = aggregator.aggregate(&"q".into()).await.unwrap();

    assert_eq!(result.answer, "p");
    assert_eq!(result.thoughts, Some(Thoughts::Log(vec!["run 1".to_string()])));
    let answers: Vec<_> = aggregator.last_runs().into_iter().map(|r| r.answer).collect();
    assert_eq!(answers, ["p", "q", "q", "p", "r"]);
}

#[tokio::test]
async fn failing_run_aborts_aggregation() {
    let aggregator = ConsistencyAggregator::with_chain(Arc::new(MockLlm::failing("rate limited")), 3);

    let err = aggregator.aggregate(&"q".into()).await.unwrap_err();

    assert!(matches!(err, AgentError::Generation(_)));
    assert!(aggregator.last_runs().is_empty());
}

#[tokio::test]
async fn aggregator_is_itself_a_reasoner() {
    let aggregator = ConsistencyAggregator::new(FixedAnswers::new(&["z"]), 2);

    let run = aggregator.reason(&"q".into()).await.unwrap();

    assert_eq!(run.answer, "z");
    assert_eq!(run.thoughts, Thoughts::Log(vec!["run 1".to_string()]));
}
