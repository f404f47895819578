pub mod demo;
pub mod evaluate;
pub mod policies;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use sap_policy::{GuardrailConfig, PolicyEngine, SystemClock};

/// Build the engine from the guardrail file, or the built-in chain if the
/// file does not exist.
pub(crate) fn load_engine(config_path: &Path) -> anyhow::Result<PolicyEngine> {
    let config = GuardrailConfig::load_or_default(config_path)
        .with_context(|| format!("loading guardrails from {}", config_path.display()))?;
    let engine = PolicyEngine::from_config(&config, Arc::new(SystemClock))?;
    tracing::info!(
        policies = config.policies.len(),
        config = %config_path.display(),
        "guardrails loaded"
    );
    Ok(engine)
}
