use crate::decision::PolicyVerdict;
use crate::error::PolicyError;
use crate::intent::PaymentIntent;
use crate::policy::Policy;

/// Escalates payments at or above a threshold to a human reviewer.
///
/// The only built-in rule that yields RequiresHumanApproval rather than
/// Denied. The bound is inclusive: `amount == threshold` escalates.
#[derive(Debug, Clone)]
pub struct ThresholdPolicy {
    threshold: u64,
}

impl ThresholdPolicy {
    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }
}

impl Policy for ThresholdPolicy {
    fn name(&self) -> &str {
        "HumanApprovalThreshold"
    }

    fn validate(&self, intent: &PaymentIntent) -> Result<PolicyVerdict, PolicyError> {
        if intent.amount >= self.threshold {
            return Ok(PolicyVerdict::require_approval(format!(
                "Transaction of {} {} exceeds autonomous threshold of {} {}.",
                intent.amount, intent.currency, self.threshold, intent.currency
            )));
        }
        Ok(PolicyVerdict::approve())
    }

    fn describe(&self) -> String {
        format!("{} (threshold {})", self.name(), self.threshold)
    }
}
