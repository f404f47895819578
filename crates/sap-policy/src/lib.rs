//! # sap-policy
//!
//! Guardrail engine for Safe Agentic Payments.
//!
//! An autonomous agent may *propose* a payment as a [`PaymentIntent`]; it
//! never moves money itself. The [`PolicyEngine`] runs every intent through
//! a fixed pipeline and returns an [`EvaluationResult`] whose [`Decision`]
//! is Approved, Denied, or RequiresHumanApproval:
//!
//! 1. duplicate suppression by idempotency key ([`IdempotencyGuard`])
//! 2. markup check on the justification ([`Sanitizer`])
//! 3. the configured chain of [`Policy`] rules, in order
//!
//! ## Key invariants
//!
//! - **Denial is final**: the first Denied verdict ends the evaluation and
//!   later policies never run.
//! - **Escalation is sticky**: a RequiresHumanApproval verdict overrides
//!   Approved from every other policy but does not stop the chain.
//! - **At most once per key**: an idempotency key is committed only on a
//!   non-denied outcome; every later evaluation with that key is Denied.
//! - **Time is injected**: policies and audit timestamps read a [`Clock`],
//!   never the wall clock directly; evaluation ids come from an
//!   [`IdGenerator`].

pub mod clock;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod idempotency;
pub mod intent;
pub mod policies;
pub mod policy;
pub mod sanitizer;

pub use clock::{Clock, FixedClock, IdGenerator, RandomIds, SequentialIds, SystemClock};
pub use config::{GuardrailConfig, PolicySpec};
pub use decision::{Decision, Outcome, PolicyVerdict};
pub use engine::{EvaluationResult, PolicyEngine};
pub use error::PolicyError;
pub use idempotency::{Admission, IdempotencyGuard, KeyReservation};
pub use intent::{Category, Currency, PaymentIntent};
pub use policies::{
    CategoryPolicy, DailyBudgetPolicy, MaxAmountPolicy, ThresholdPolicy, TimeBasedPolicy,
};
pub use policy::Policy;
pub use sanitizer::Sanitizer;

pub use sap_audit::{AuditActor, AuditEntry, AuditTrail};
