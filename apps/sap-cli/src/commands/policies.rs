// policies.rs - `sap policies`: print the guardrail chain.

use std::path::Path;
use std::process::ExitCode;

pub fn execute(config: &Path) -> anyhow::Result<ExitCode> {
    let engine = super::load_engine(config)?;
    let mut count = 0;
    for (index, policy) in engine.policies().enumerate() {
        println!("{:>2}. {}", index + 1, policy.describe());
        count += 1;
    }
    if count == 0 {
        println!("No guardrails configured: every non-duplicate, markup-free intent is approved.");
    }
    Ok(ExitCode::SUCCESS)
}
