// policy.rs - The guardrail capability every rule implements.

use crate::decision::PolicyVerdict;
use crate::error::PolicyError;
use crate::intent::PaymentIntent;

/// A single guardrail rule.
///
/// Policies see only the intent. They never consult the idempotency guard
/// or each other; ordering is the engine's job. `Send + Sync` lets one
/// engine serve concurrent evaluations, so any running state a policy keeps
/// must sit behind its own lock.
pub trait Policy: Send + Sync {
    /// Stable identifier used in audit entries and reasons.
    fn name(&self) -> &str;

    /// Judge one intent.
    fn validate(&self, intent: &PaymentIntent) -> Result<PolicyVerdict, PolicyError>;

    /// Undo whatever `validate` recorded for `intent` after it returned a
    /// non-denied verdict. Called by the engine when a later policy denies
    /// or fails. Stateless policies keep the default.
    fn rollback(&self, _intent: &PaymentIntent) -> Result<(), PolicyError> {
        Ok(())
    }

    /// Human-readable summary of the rule and its parameters.
    fn describe(&self) -> String {
        self.name().to_string()
    }
}
