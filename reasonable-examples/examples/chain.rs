//! Example: chain-of-thought over a scripted generator.
//!
//! Settings come from the environment, `.env` or `~/.config/reasonable/config.toml` (`[env]`),
//! e.g. `REASONABLE_MAX_STEPS=4`. The generator is a [`MockLlm`] so no network is needed.
//!
//! Run: `cargo run -p reasonable-examples --example chain -- "What is 2+2?"`

use std::env;
use std::sync::Arc;

use reasonable::{ChainReasoner, MockLlm, ReasonInput, Reasoner, ReasonerSettings, Thoughts};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let applied = env_config::load_and_apply("reasonable", None)?;
    if !applied.is_empty() {
        println!("config keys applied: {}", applied.join(", "));
    }
    let settings = ReasonerSettings::from_env()?;

    let question = env::args().nth(1).unwrap_or_else(|| "What is 2+2?".to_string());
    let llm = Arc::new(MockLlm::scripted([
        "<reasoning>The question asks for a sum of two small integers.</reasoning>\
         <next_action>continue</next_action>",
        "<reasoning>2 + 2 = 4</reasoning><next_action>final_answer</next_action>",
        "4",
    ]));

    let chain = ChainReasoner::from_settings(llm, &settings);
    let run = chain.reason(&ReasonInput::from(question)).await?;

    if let Thoughts::Log(thoughts) = &run.thoughts {
        for (i, thought) in thoughts.iter().enumerate() {
            println!("step {}: {}", i + 1, thought);
        }
    }
    println!("answer: {}", run.answer);
    Ok(())
}
