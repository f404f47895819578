// trail.rs - Append-only audit trail for one evaluation.
//
// The trail is created empty at the start of an evaluation and handed back
// to the caller inside the evaluation result. There is no removal or
// mutation API: entries can only be appended.

use std::ops::Index;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::{AuditActor, AuditEntry};

/// Ordered sequence of [`AuditEntry`] records for a single evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AuditTrail {
    entries: Vec<AuditEntry>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: AuditEntry) {
        self.entries.push(entry);
    }

    /// Append a SYSTEM entry with no details.
    pub fn record_system(&mut self, timestamp: DateTime<Utc>, action: impl Into<String>) {
        self.push(AuditEntry::new(timestamp, AuditActor::System, action));
    }

    /// Append an AGENT entry.
    pub fn record_agent(
        &mut self,
        timestamp: DateTime<Utc>,
        action: impl Into<String>,
        details: impl Into<String>,
    ) {
        self.push(AuditEntry::new(timestamp, AuditActor::Agent, action).with_details(details));
    }

    /// Append a HUMAN entry, e.g. an approver signing off an escalation
    /// after the engine has returned.
    pub fn record_human(
        &mut self,
        timestamp: DateTime<Utc>,
        action: impl Into<String>,
        details: Option<String>,
    ) {
        let mut entry = AuditEntry::new(timestamp, AuditActor::Human, action);
        entry.details = details;
        self.push(entry);
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&AuditEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AuditEntry> {
        self.entries.iter()
    }

    /// Actions in order, handy for assertions and terminal output.
    pub fn actions(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.action.as_str()).collect()
    }

    /// Whether any entry's action contains `needle`.
    pub fn contains_action(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.action.contains(needle))
    }
}

impl Index<usize> for AuditTrail {
    type Output = AuditEntry;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a AuditTrail {
    type Item = &'a AuditEntry;
    type IntoIter = std::slice::Iter<'a, AuditEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for AuditTrail {
    type Item = AuditEntry;
    type IntoIter = std::vec::IntoIter<AuditEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
