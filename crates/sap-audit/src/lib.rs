//! # sap-audit
//!
//! Audit trail types for Safe Agentic Payments.
//!
//! Every guardrail evaluation produces its own [`AuditTrail`]: an ordered,
//! append-only list of [`AuditEntry`] records describing each check the
//! engine ran. Entries are attributed to an [`AuditActor`] so a reviewer can
//! tell system checks apart from agent input and human sign-off.
//!
//! ## Quick Example
//!
//! ```rust
//! use chrono::Utc;
//! use sap_audit::{AuditActor, AuditEntry, AuditTrail};
//!
//! let mut trail = AuditTrail::new();
//! trail.push(AuditEntry::new(Utc::now(), AuditActor::System, "Evaluation started: 42"));
//! assert_eq!(trail.len(), 1);
//! ```

pub mod entry;
pub mod trail;

pub use entry::{AuditActor, AuditEntry};
pub use trail::AuditTrail;
