use crate::decision::PolicyVerdict;
use crate::error::PolicyError;
use crate::intent::PaymentIntent;
use crate::policy::Policy;

/// Denies any single payment above a hard cap.
#[derive(Debug, Clone)]
pub struct MaxAmountPolicy {
    limit: u64,
}

impl MaxAmountPolicy {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl Policy for MaxAmountPolicy {
    fn name(&self) -> &str {
        "MaxAmountLimit"
    }

    fn validate(&self, intent: &PaymentIntent) -> Result<PolicyVerdict, PolicyError> {
        if intent.amount > self.limit {
            return Ok(PolicyVerdict::deny(format!(
                "Amount {} exceeds limit of {}",
                intent.amount, self.limit
            )));
        }
        Ok(PolicyVerdict::approve())
    }

    fn describe(&self) -> String {
        format!("{} (limit {})", self.name(), self.limit)
    }
}
