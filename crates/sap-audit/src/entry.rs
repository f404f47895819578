// entry.rs - Audit entry data model.
//
// An AuditEntry is one line of a decision record: who acted, what they did,
// and when. Entries are immutable once built; the trail only appends.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who performed the recorded action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditActor {
    /// The guardrail engine itself.
    System,
    /// The autonomous agent that proposed the payment.
    Agent,
    /// A human reviewer acting on an escalated decision.
    Human,
}

impl fmt::Display for AuditActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditActor::System => write!(f, "SYSTEM"),
            AuditActor::Agent => write!(f, "AGENT"),
            AuditActor::Human => write!(f, "HUMAN"),
        }
    }
}

/// A single timestamped record in an [`AuditTrail`](crate::AuditTrail).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEntry {
    /// When the action happened (UTC, taken from the engine's clock).
    pub timestamp: DateTime<Utc>,
    /// Who performed the action.
    pub actor: AuditActor,
    /// Short description, e.g. "Policy 'MaxAmountLimit' approved."
    pub action: String,
    /// Optional free-form context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AuditEntry {
    pub fn new(timestamp: DateTime<Utc>, actor: AuditActor, action: impl Into<String>) -> Self {
        Self {
            timestamp,
            actor,
            action: action.into(),
            details: None,
        }
    }

    /// Attach details and return self (builder pattern).
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.timestamp.to_rfc3339(),
            self.actor,
            self.action
        )?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}
