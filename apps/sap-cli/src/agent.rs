// agent.rs - Stand-in for the autonomous agent that proposes payments.

use sap_policy::{Category, Currency, PaymentIntent};
use uuid::Uuid;

/// Proposes the same hardware purchase every time, with a fresh key.
#[derive(Debug, Clone)]
pub struct MockAgent {
    amount: u64,
    category: Category,
}

impl MockAgent {
    pub fn new(amount: u64, category: Category) -> Self {
        Self { amount, category }
    }

    pub fn propose(&self) -> PaymentIntent {
        PaymentIntent {
            // Two hyphenated UUIDs (72 chars) comfortably clear the 32-char minimum.
            idempotency_key: format!("{}-{}", Uuid::new_v4(), Uuid::new_v4()),
            goal: "Equip the new Lead Designer with necessary hardware".to_string(),
            amount: self.amount,
            currency: Currency::Gbp,
            beneficiary: "Apple Store London".to_string(),
            category: self.category,
            justification: "Buying a new Macbook for the design team.".to_string(),
        }
    }
}

impl Default for MockAgent {
    fn default() -> Self {
        Self::new(500, Category::Equipment)
    }
}
