// demo.rs - `sap demo`: the full agent → guardrails → bank loop.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use clap::Args;
use sap_policy::{Category, Decision, EvaluationResult, PolicyEngine};

use crate::agent::MockAgent;
use crate::payment::{MockPaymentService, PaymentExecutor};

#[derive(Args)]
pub struct DemoArgs {
    /// Amount the agent proposes (minor units).
    #[arg(long, default_value_t = 500)]
    amount: u64,
    /// Spend category the agent declares.
    #[arg(long, default_value = "equipment")]
    category: Category,
    /// Submit the same intent a second time to show duplicate suppression.
    #[arg(long)]
    repeat: bool,
    /// Simulated bank latency in milliseconds.
    #[arg(long, default_value_t = 800)]
    latency_ms: u64,
    /// Probability (0.0-1.0) that the simulated bank call fails.
    #[arg(long, default_value_t = 0.1)]
    failure_rate: f64,
}

pub async fn execute(config: &Path, args: &DemoArgs) -> anyhow::Result<ExitCode> {
    let engine = super::load_engine(config)?;
    let agent = MockAgent::new(args.amount, args.category);
    let bank = MockPaymentService::new(Duration::from_millis(args.latency_ms), args.failure_rate);

    println!("Agent is generating a payment intent...");
    let intent = agent.propose();
    println!("{}", serde_json::to_string_pretty(&intent)?);

    let attempts = if args.repeat { 2 } else { 1 };
    let mut last = Decision::Approved;
    for attempt in 1..=attempts {
        println!("\nRunning guardrails (attempt {})...", attempt);
        let result = engine.evaluate(&intent)?;
        print_trail(&result);
        last = result.decision;

        match result.decision {
            Decision::Approved => {
                println!("APPROVED. Proceeding to execution.");
                match bank.execute(&intent).await {
                    Ok(receipt) => {
                        println!("Payment successful: {}", serde_json::to_string(&receipt)?)
                    }
                    Err(err) => {
                        tracing::warn!(
                            idempotency_key = %intent.idempotency_key,
                            error = %err,
                            "execution failed after approval; idempotency key stays committed"
                        );
                        println!("Execution failed: {}", err);
                    }
                }
            }
            Decision::RequiresHumanApproval => {
                println!("HELD for human sign-off. Reason: {}", reason(&result));
            }
            Decision::Denied => {
                println!("BLOCKED. Reason: {}", reason(&result));
            }
        }
    }

    report_engine_state(&engine, &intent.idempotency_key)?;
    Ok(super::evaluate::exit_code(last))
}

fn reason(result: &EvaluationResult) -> &str {
    result.reason.as_deref().unwrap_or("none given")
}

fn print_trail(result: &EvaluationResult) {
    for entry in &result.audit_trail {
        println!("  {}", entry);
    }
}

fn report_engine_state(engine: &PolicyEngine, key: &str) -> anyhow::Result<()> {
    let guard = engine.idempotency_guard();
    tracing::debug!(
        committed = guard.committed_count()?,
        key_committed = guard.has_processed(key)?,
        "idempotency state"
    );
    Ok(())
}
