// decision.rs - Decision values produced by policies and the engine.
//
// Decision variants are declared in ascending severity so the derived `Ord`
// is the aggregation order: Approved < RequiresHumanApproval < Denied.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Final or per-policy decision about an intent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Safe to hand to the execution service.
    Approved,
    /// Not denied, but a human must sign off before execution.
    RequiresHumanApproval,
    /// Must not be executed.
    Denied,
}

impl Decision {
    /// The more severe of two decisions.
    pub fn escalate(self, other: Decision) -> Decision {
        self.max(other)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Decision::Approved => "APPROVED",
            Decision::RequiresHumanApproval => "REQUIRES_HUMAN_APPROVAL",
            Decision::Denied => "DENIED",
        };
        f.write_str(label)
    }
}

/// What a single policy concluded about a single intent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyVerdict {
    pub decision: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PolicyVerdict {
    pub fn approve() -> Self {
        Self {
            decision: Decision::Approved,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            decision: Decision::Denied,
            reason: Some(reason.into()),
        }
    }

    pub fn require_approval(reason: impl Into<String>) -> Self {
        Self {
            decision: Decision::RequiresHumanApproval,
            reason: Some(reason.into()),
        }
    }

    /// Reason text, or "no reason given" for reasonless verdicts.
    pub fn reason_or_default(&self) -> &str {
        self.reason.as_deref().unwrap_or("no reason given")
    }
}

/// Why the engine reached its final decision.
///
/// Each variant maps to exactly one [`Decision`] via [`Outcome::decision`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The idempotency key was already committed.
    DuplicateRequest,
    /// The justification contained markup.
    SecurityViolation,
    /// The named policy denied the intent.
    PolicyViolation { policy: String },
    /// One or more policies escalated and none denied.
    RequiresApproval { policies: Vec<String> },
    /// No policy objected.
    Approved,
}

impl Outcome {
    pub fn decision(&self) -> Decision {
        match self {
            Outcome::DuplicateRequest
            | Outcome::SecurityViolation
            | Outcome::PolicyViolation { .. } => Decision::Denied,
            Outcome::RequiresApproval { .. } => Decision::RequiresHumanApproval,
            Outcome::Approved => Decision::Approved,
        }
    }
}
