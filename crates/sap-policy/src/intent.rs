// intent.rs - The payment intent an agent proposes.
//
// Intents arrive already validated against the upstream schema (key length,
// positive amount, non-empty text). The engine treats them as read-only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Settlement currency of an intent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Gbp,
    Usd,
    Eur,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Currency::Gbp => "GBP",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        };
        f.write_str(code)
    }
}

/// Spend category declared by the agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Equipment,
    Software,
    Travel,
    Services,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Equipment => "equipment",
            Category::Software => "software",
            Category::Travel => "travel",
            Category::Services => "services",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equipment" => Ok(Category::Equipment),
            "software" => Ok(Category::Software),
            "travel" => Ok(Category::Travel),
            "services" => Ok(Category::Services),
            "other" => Ok(Category::Other),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

/// A proposed payment awaiting guardrail evaluation.
///
/// Field names follow the upstream JSON contract (`idempotencyKey`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Caller-supplied token, unique per logical request (32+ chars).
    pub idempotency_key: String,
    /// The high-level objective the agent was given.
    pub goal: String,
    /// Total cost in minor currency units.
    pub amount: u64,
    pub currency: Currency,
    /// Who gets paid.
    pub beneficiary: String,
    pub category: Category,
    /// Free text explaining why the purchase is needed. Must be plain text.
    pub justification: String,
}
