//! Example: tree-of-thoughts with depth 2 and two branches per node.
//!
//! Prints the rendered tree and writes the nested log next to the working directory.
//!
//! Run: `cargo run -p reasonable-examples --example tree -- tree_log.json`

use std::env;
use std::sync::Arc;

use reasonable::{MockLlm, Reasoner, TreeReasoner};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let log_path = env::args().nth(1).unwrap_or_else(|| "tree_log.json".to_string());
    let llm = Arc::new(MockLlm::scripted([
        // root branches
        "Count the apples in each basket.",
        "Add the baskets directly.",
        // first branch, then its two leaves
        "Basket one has 3 apples.",
        "Basket two has 4 apples.",
        "7",
        "7",
        // second branch answers at once
        "FINAL_ANSWER: 7",
    ]));

    let tree = TreeReasoner::new(llm).with_max_depth(2).with_branch_factor(2);
    let run = tree
        .reason(&"Two baskets hold 3 and 4 apples. How many apples?".into())
        .await?;

    print!("{}", tree.visualize());
    println!("answer: {}", run.answer);

    let format = if log_path.ends_with(".csv") { "csv" } else { "json" };
    tree.save_log(&log_path, format)?;
    println!("log written to {log_path}");
    Ok(())
}
