use crate::output::{describe_outcome, print_json};
use anyhow::Context;
use deck_core::{ActionExecutor, FileStore, TriggerResolver};
use std::path::Path;
use std::sync::Arc;

pub fn run(home: &Path, index: u32, json: bool) -> anyhow::Result<()> {
    let resolver = TriggerResolver::new(Arc::new(FileStore::open(home)), ActionExecutor::native());

    let rt = tokio::runtime::Runtime::new()?;
    let outcomes = rt
        .block_on(resolver.resolve_and_run(index))
        .with_context(|| format!("failed to trigger button {index}"))?;

    if json {
        return print_json(&serde_json::json!({
            "button": index,
            "outcomes": outcomes,
        }));
    }

    if outcomes.is_empty() {
        println!("Button {index}: nothing to run.");
        return Ok(());
    }
    for (i, outcome) in outcomes.iter().enumerate() {
        println!("  [{}] {}", i + 1, describe_outcome(outcome));
    }
    Ok(())
}
