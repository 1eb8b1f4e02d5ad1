//! Example: self-consistency over five chain runs.
//!
//! The scripted generator disagrees with itself once; the majority answer wins and the
//! per-run answers are printed as the csv log would hold them.
//!
//! Run: `cargo run -p reasonable-examples --example consistency`

use std::sync::Arc;

use reasonable::{ConsistencyAggregator, MockLlm};
use tracing_subscriber::EnvFilter;

const STEP: &str = "<reasoning>Look up the capital.</reasoning><next_action>final_answer</next_action>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let llm = Arc::new(MockLlm::scripted([
        STEP, "Paris", STEP, "Lyon", STEP, "Paris", STEP, "Paris", STEP, "Paris",
    ]));
    let aggregator = ConsistencyAggregator::with_chain(llm, 5);

    let result = aggregator.aggregate(&"What is the capital of France?".into()).await?;
    for (i, run) in aggregator.last_runs().iter().enumerate() {
        println!("run {}: {}", i + 1, run.answer);
    }
    println!("answer: {}", result.answer);
    if let Some(thoughts) = &result.thoughts {
        println!("thoughts: {}", serde_json::to_string(thoughts)?);
    }
    Ok(())
}
