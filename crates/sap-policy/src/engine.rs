// engine.rs - Guardrail evaluation engine.
//
// Every payment intent passes through `evaluate()`:
//
// 1. Reserve the idempotency key (waiting out a same-key evaluation)
//    → already committed? → Deny
// 2. Sanitize the justification → markup found? → Deny
// 3. Run each policy in order:
//      Denied                → roll back earlier policies, Deny now
//      RequiresHumanApproval → remember it, keep going
//      Approved              → keep going
// 4. Commit the key → RequiresHumanApproval if anyone escalated, else Approve
//
// Denial is the only early exit. A fault (poisoned state, failing policy)
// aborts the single evaluation with the key released and earlier policy
// state rolled back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sap_audit::{AuditActor, AuditEntry, AuditTrail};

use crate::clock::{Clock, IdGenerator, RandomIds, SystemClock};
use crate::config::GuardrailConfig;
use crate::decision::{Decision, Outcome, PolicyVerdict};
use crate::error::PolicyError;
use crate::idempotency::{Admission, IdempotencyGuard};
use crate::intent::PaymentIntent;
use crate::policy::Policy;
use crate::sanitizer::Sanitizer;

/// The result of one `evaluate()` call. Never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Unique per evaluation.
    pub id: Uuid,
    pub decision: Decision,
    pub reason: Option<String>,
    /// Which branch of the pipeline produced the decision.
    pub outcome: Outcome,
    /// Every check performed, in order.
    pub audit_trail: AuditTrail,
}

impl EvaluationResult {
    pub fn is_approved(&self) -> bool {
        self.decision == Decision::Approved
    }

    pub fn requires_human_approval(&self) -> bool {
        self.decision == Decision::RequiresHumanApproval
    }

    pub fn is_denied(&self) -> bool {
        self.decision == Decision::Denied
    }
}

/// Runs intents through duplicate suppression, sanitization and the
/// configured policy chain.
///
/// Takes `&self` everywhere: share one engine across threads with `Arc`.
pub struct PolicyEngine {
    policies: Vec<Box<dyn Policy>>,
    guard: Arc<IdempotencyGuard>,
    sanitizer: Sanitizer,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl PolicyEngine {
    /// Create an engine over `policies` (evaluated in the given order),
    /// reading time from the system clock.
    pub fn new(policies: Vec<Box<dyn Policy>>) -> Result<Self, PolicyError> {
        Self::with_clock(policies, Arc::new(SystemClock))
    }

    /// Create an engine that stamps audit entries from `clock`.
    pub fn with_clock(
        policies: Vec<Box<dyn Policy>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PolicyError> {
        Ok(Self {
            policies,
            guard: Arc::new(IdempotencyGuard::new()),
            sanitizer: Sanitizer::new()?,
            clock,
            ids: Arc::new(RandomIds),
        })
    }

    /// Build the policy chain described by `config`, sharing `clock`.
    pub fn from_config(
        config: &GuardrailConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PolicyError> {
        let policies = config.build(clock.clone())?;
        Self::with_clock(policies, clock)
    }

    /// Draw evaluation ids from `ids` instead of random UUIDs.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn idempotency_guard(&self) -> &Arc<IdempotencyGuard> {
        &self.guard
    }

    /// The configured chain, in evaluation order.
    pub fn policies(&self) -> impl Iterator<Item = &dyn Policy> {
        self.policies.iter().map(|p| p.as_ref())
    }

    /// Evaluate one intent and return the decision with its audit trail.
    pub fn evaluate(&self, intent: &PaymentIntent) -> Result<EvaluationResult, PolicyError> {
        let id = self.ids.next_id();
        let key = intent.idempotency_key.as_str();
        let mut trail = AuditTrail::new();
        trail.record_system(self.clock.now(), format!("Evaluation started: {}", id));
        trail.record_agent(self.clock.now(), "Payment intent proposed", intent.goal.clone());

        // Step 1: duplicate suppression. Cheapest check, runs first.
        let reservation = match self.guard.reserve(key)? {
            Admission::Admitted(reservation) => reservation,
            Admission::AlreadyCommitted => {
                tracing::warn!(evaluation_id = %id, idempotency_key = key, "duplicate payment rejected");
                return Ok(finish(
                    id,
                    Outcome::DuplicateRequest,
                    format!(
                        "Duplicate Payment: idempotency key '{}' has already been processed.",
                        key
                    ),
                    trail,
                ));
            }
        };

        // Step 2: the justification must be plain text.
        if !self.sanitizer.is_clean(&intent.justification) {
            tracing::warn!(evaluation_id = %id, idempotency_key = key, "markup in justification");
            return Ok(finish(
                id,
                Outcome::SecurityViolation,
                "Security Violation: HTML detected in justification.".to_string(),
                trail,
            ));
        }

        trail.record_system(self.clock.now(), "Idempotency check passed.");
        trail.record_system(self.clock.now(), "Sanitization check passed.");

        // Step 3: the policy chain.
        let mut accepted: Vec<&dyn Policy> = Vec::with_capacity(self.policies.len());
        let mut escalated: Vec<String> = Vec::new();
        let mut aggregate = Decision::Approved;

        for policy in self.policies() {
            let verdict = match policy.validate(intent) {
                Ok(verdict) => verdict,
                Err(err) => {
                    tracing::error!(evaluation_id = %id, policy = policy.name(), error = %err, "policy failed");
                    self.roll_back(&accepted, intent);
                    return Err(err);
                }
            };
            tracing::debug!(evaluation_id = %id, policy = policy.name(), decision = %verdict.decision, "policy verdict");
            aggregate = aggregate.escalate(verdict.decision);

            match verdict.decision {
                Decision::Denied => {
                    self.roll_back(&accepted, intent);
                    let reason = format!(
                        "Policy '{}' violated: {}",
                        policy.name(),
                        verdict.reason_or_default()
                    );
                    tracing::warn!(evaluation_id = %id, idempotency_key = key, policy = policy.name(), %reason, "intent denied");
                    return Ok(finish(
                        id,
                        Outcome::PolicyViolation {
                            policy: policy.name().to_string(),
                        },
                        reason,
                        trail,
                    ));
                }
                Decision::RequiresHumanApproval => {
                    record_escalation(&mut trail, self.clock.as_ref(), policy, &verdict);
                    escalated.push(policy.name().to_string());
                }
                Decision::Approved => {
                    trail.record_system(
                        self.clock.now(),
                        format!("Policy '{}' approved.", policy.name()),
                    );
                }
            }
            accepted.push(policy);
        }

        // Step 4: no denial, so the key is spent.
        if let Err(err) = reservation.commit() {
            self.roll_back(&accepted, intent);
            return Err(err);
        }

        let (outcome, reason) = match aggregate {
            Decision::RequiresHumanApproval => (
                Outcome::RequiresApproval {
                    policies: escalated,
                },
                "Pending human sign-off",
            ),
            _ => (Outcome::Approved, "Auto-approved"),
        };
        tracing::info!(
            evaluation_id = %id,
            idempotency_key = key,
            decision = %outcome.decision(),
            amount = intent.amount,
            "evaluation complete"
        );
        Ok(finish(id, outcome, reason.to_string(), trail))
    }

    /// Undo policy state for `intent`, most recent first. Failures are
    /// logged; the evaluation is already ending.
    fn roll_back(&self, accepted: &[&dyn Policy], intent: &PaymentIntent) {
        for policy in accepted.iter().rev() {
            if let Err(err) = policy.rollback(intent) {
                tracing::error!(policy = policy.name(), error = %err, "policy rollback failed");
            }
        }
    }
}

fn record_escalation(
    trail: &mut AuditTrail,
    clock: &dyn Clock,
    policy: &dyn Policy,
    verdict: &PolicyVerdict,
) {
    let action = format!("Policy '{}' requires human approval.", policy.name());
    let entry = AuditEntry::new(clock.now(), AuditActor::System, action);
    match &verdict.reason {
        Some(reason) => trail.push(entry.with_details(reason.clone())),
        None => trail.push(entry),
    }
}

fn finish(id: Uuid, outcome: Outcome, reason: String, audit_trail: AuditTrail) -> EvaluationResult {
    EvaluationResult {
        id,
        decision: outcome.decision(),
        reason: Some(reason),
        outcome,
        audit_trail,
    }
}
