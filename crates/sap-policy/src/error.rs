// error.rs - Error types for the guardrail engine.
//
// Guardrail outcomes (duplicate, security violation, policy violation,
// escalation) are decisions, not errors. These variants cover faults only:
// bad configuration and broken shared state.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring or running the engine.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The guardrail config file could not be read.
    #[error("failed to read guardrail config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The guardrail config file is not valid YAML for the expected schema.
    #[error("failed to parse guardrail config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// A policy parameter is out of range (zero limit, empty window, ...).
    #[error("invalid guardrail config: {reason}")]
    InvalidConfig { reason: String },

    /// A sanitizer pattern failed to compile.
    #[error("invalid sanitizer pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A mutex guarding shared state was poisoned by a panicking thread.
    #[error("shared state of {component} is poisoned")]
    StatePoisoned { component: String },

    /// A policy implementation failed while evaluating an intent.
    #[error("policy '{policy}' failed: {reason}")]
    PolicyFailed { policy: String, reason: String },
}

impl PolicyError {
    pub(crate) fn poisoned(component: impl Into<String>) -> Self {
        PolicyError::StatePoisoned {
            component: component.into(),
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        PolicyError::InvalidConfig {
            reason: reason.into(),
        }
    }
}
