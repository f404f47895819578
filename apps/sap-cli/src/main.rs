//! # sap-cli
//!
//! Command-line front end for Safe Agentic Payments.
//!
//! - `sap evaluate <intent.json>`: run one intent through the guardrails and
//!   print the evaluation result as JSON
//! - `sap demo`: mock agent proposes a payment, guardrails evaluate it, and
//!   an approved payment goes to the mock execution service
//! - `sap policies`: show the configured guardrail chain

mod agent;
mod commands;
mod payment;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Safe Agentic Payments: guardrails between an agent and the bank.
#[derive(Parser)]
#[command(name = "sap", version, about)]
struct Cli {
    /// Guardrail chain (YAML). Falls back to the built-in chain when absent.
    #[arg(long, default_value = ".sap/guardrails.yaml")]
    config: PathBuf,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a payment intent read from a JSON file ("-" for stdin).
    Evaluate {
        /// Path to the intent JSON.
        intent: PathBuf,
    },
    /// Run the agent → guardrails → execution loop once with mock collaborators.
    Demo(commands::demo::DemoArgs),
    /// List the guardrails in evaluation order.
    Policies,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.json_logs)?;

    match &cli.command {
        Commands::Evaluate { intent } => commands::evaluate::execute(&cli.config, intent),
        Commands::Demo(args) => commands::demo::execute(&cli.config, args).await,
        Commands::Policies => commands::policies::execute(&cli.config),
    }
}

/// Logs go to stderr so stdout stays clean for JSON results.
fn init_logging(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("sap_policy=info".parse()?)
        .add_directive("sap_cli=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
