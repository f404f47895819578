// evaluate.rs - `sap evaluate`: one intent in, one JSON result out.

use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use sap_policy::{Decision, PaymentIntent};

/// Exit status for a decision: 0 approved, 1 denied, 2 needs a human.
pub fn exit_code(decision: Decision) -> ExitCode {
    match decision {
        Decision::Approved => ExitCode::SUCCESS,
        Decision::Denied => ExitCode::from(1),
        Decision::RequiresHumanApproval => ExitCode::from(2),
    }
}

pub fn execute(config: &Path, intent_path: &Path) -> anyhow::Result<ExitCode> {
    let raw = read_input(intent_path)?;
    let intent: PaymentIntent = serde_json::from_str(&raw)
        .with_context(|| format!("parsing payment intent from {}", intent_path.display()))?;

    let engine = super::load_engine(config)?;
    let result = engine.evaluate(&intent)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(exit_code(result.decision))
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading payment intent from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
