// guardrail_flow.rs - End-to-end guardrail scenarios.
//
// Drives the public API the way the agent loop does: build a chain, submit
// intents, inspect decisions and audit trails. Covers duplicate
// suppression, markup rejection, ordering between denial and escalation,
// budget accumulation with day rollover, the threshold boundary, and one
// engine shared across threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration as StdDuration;

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use sap_policy::{
    CategoryPolicy, Category, Clock, Currency, DailyBudgetPolicy, Decision, FixedClock,
    GuardrailConfig, MaxAmountPolicy, Outcome, PaymentIntent, Policy, PolicyEngine,
    PolicyError, PolicyVerdict, ThresholdPolicy, TimeBasedPolicy,
};

fn business_hours_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 11, 5, 10, 15, 0).unwrap(),
    ))
}

/// A 36-char key, unique per call.
fn fresh_key() -> String {
    Uuid::new_v4().to_string()
}

fn hosting_intent(amount: u64) -> PaymentIntent {
    PaymentIntent {
        idempotency_key: fresh_key(),
        goal: "Keep the customer-facing app online".to_string(),
        amount,
        currency: Currency::Gbp,
        beneficiary: "Cloud Provider Ltd".to_string(),
        category: Category::Software,
        justification: "Cloud hosting for the main app".to_string(),
    }
}

fn amount_and_category_engine() -> PolicyEngine {
    PolicyEngine::with_clock(
        vec![
            Box::new(MaxAmountPolicy::new(1000)),
            Box::new(CategoryPolicy::new()),
        ],
        business_hours_clock(),
    )
    .unwrap()
}

/// Lets a test keep a handle on a stateful policy the engine owns.
struct Shared<P>(Arc<P>);

impl<P: Policy> Policy for Shared<P> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn validate(&self, intent: &PaymentIntent) -> Result<PolicyVerdict, PolicyError> {
        self.0.validate(intent)
    }

    fn rollback(&self, intent: &PaymentIntent) -> Result<(), PolicyError> {
        self.0.rollback(intent)
    }
}

// =========================================================
// The reference scenario: hosting spend through [MaxAmount(1000), Category]
// =========================================================

#[test]
fn hosting_payment_within_limits_is_approved() {
    let engine = amount_and_category_engine();
    let result = engine.evaluate(&hosting_intent(500)).unwrap();

    assert_eq!(result.decision, Decision::Approved);
    assert!(result.audit_trail.contains_action("Policy 'AllowedCategories' approved."));
}

#[test]
fn hosting_payment_over_limit_is_denied() {
    let engine = amount_and_category_engine();
    let result = engine.evaluate(&hosting_intent(1001)).unwrap();

    assert_eq!(result.decision, Decision::Denied);
    assert!(result.reason.unwrap().contains("exceeds limit"));
}

#[test]
fn services_category_is_denied() {
    let engine = amount_and_category_engine();
    let mut intent = hosting_intent(500);
    intent.category = Category::Services;
    let result = engine.evaluate(&intent).unwrap();

    assert_eq!(result.decision, Decision::Denied);
    assert!(result.reason.unwrap().contains("not in the approved list"));
}

// =========================================================
// Duplicate suppression and sanitization
// =========================================================

#[test]
fn second_submission_of_a_key_is_a_duplicate() {
    let engine = PolicyEngine::with_clock(
        vec![Box::new(ThresholdPolicy::new(100))],
        business_hours_clock(),
    )
    .unwrap();
    let intent = hosting_intent(250);

    let first = engine.evaluate(&intent).unwrap();
    assert_eq!(first.decision, Decision::RequiresHumanApproval);

    let second = engine.evaluate(&intent).unwrap();
    assert_eq!(second.decision, Decision::Denied);
    assert_eq!(second.outcome, Outcome::DuplicateRequest);
    assert!(second.reason.unwrap().contains("Duplicate Payment"));
}

#[test]
fn markup_is_denied_whatever_the_other_fields_say() {
    let engine = amount_and_category_engine();
    for justification in [
        "<b>urgent</b> server renewal",
        "Renewal <img src=x onerror=pay()>",
        "Renewal<script>transfer()</script>",
    ] {
        for amount in [1, 500, 50_000] {
            let mut intent = hosting_intent(amount);
            intent.justification = justification.to_string();
            let result = engine.evaluate(&intent).unwrap();
            assert_eq!(result.outcome, Outcome::SecurityViolation, "{}", justification);
            assert!(result.reason.unwrap().contains("Security Violation"));
        }
    }
}

// =========================================================
// Ordering: denial always beats escalation
// =========================================================

#[test]
fn amount_cap_wins_over_threshold_in_either_order() {
    let clock = business_hours_clock();
    let cap_first = PolicyEngine::with_clock(
        vec![
            Box::new(MaxAmountPolicy::new(1000)),
            Box::new(ThresholdPolicy::new(5000)),
        ],
        clock.clone(),
    )
    .unwrap();
    let threshold_first = PolicyEngine::with_clock(
        vec![
            Box::new(ThresholdPolicy::new(500)),
            Box::new(MaxAmountPolicy::new(1000)),
        ],
        clock,
    )
    .unwrap();

    let over_cap = cap_first.evaluate(&hosting_intent(6000)).unwrap();
    assert_eq!(over_cap.decision, Decision::Denied);
    assert_eq!(
        over_cap.outcome,
        Outcome::PolicyViolation {
            policy: "MaxAmountLimit".into()
        }
    );

    let escalated_then_denied = threshold_first.evaluate(&hosting_intent(1500)).unwrap();
    assert_eq!(escalated_then_denied.decision, Decision::Denied);
    assert!(escalated_then_denied
        .audit_trail
        .contains_action("Policy 'HumanApprovalThreshold' requires human approval."));
}

#[test]
fn threshold_boundary_is_inclusive() {
    let engine = PolicyEngine::with_clock(
        vec![Box::new(ThresholdPolicy::new(750))],
        business_hours_clock(),
    )
    .unwrap();

    assert_eq!(
        engine.evaluate(&hosting_intent(750)).unwrap().decision,
        Decision::RequiresHumanApproval
    );
    assert_eq!(
        engine.evaluate(&hosting_intent(749)).unwrap().decision,
        Decision::Approved
    );
}

// =========================================================
// Stateful and time-aware policies
// =========================================================

#[test]
fn daily_budget_accumulates_and_rolls_over() {
    let clock = business_hours_clock();
    let budget = Arc::new(DailyBudgetPolicy::new(1000, clock.clone()));
    let engine =
        PolicyEngine::with_clock(vec![Box::new(Shared(budget.clone()))], clock.clone()).unwrap();

    assert!(engine.evaluate(&hosting_intent(400)).unwrap().is_approved());
    assert!(engine.evaluate(&hosting_intent(600)).unwrap().is_approved());

    let third = engine.evaluate(&hosting_intent(1)).unwrap();
    assert_eq!(third.decision, Decision::Denied);
    assert!(third.reason.unwrap().contains("Daily budget exceeded"));

    clock.advance(Duration::days(1));
    assert_eq!(budget.spent_today().unwrap(), 0);
    assert!(engine.evaluate(&hosting_intent(1000)).unwrap().is_approved());
}

/// Crosses midnight mid-evaluation, lets another payment spend on the new
/// day, then denies.
struct DeniesAfterMidnight {
    clock: Arc<FixedClock>,
    budget: Arc<DailyBudgetPolicy>,
}

impl Policy for DeniesAfterMidnight {
    fn name(&self) -> &str {
        "DeniesAfterMidnight"
    }

    fn validate(&self, _intent: &PaymentIntent) -> Result<PolicyVerdict, PolicyError> {
        self.clock.advance(Duration::hours(2));
        let verdict = self.budget.validate(&hosting_intent(500))?;
        assert_eq!(verdict.decision, Decision::Approved);
        Ok(PolicyVerdict::deny("settlement window closed"))
    }
}

#[test]
fn rollback_across_midnight_keeps_new_day_spend() {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 11, 5, 23, 0, 0).unwrap(),
    ));
    let budget = Arc::new(DailyBudgetPolicy::new(1000, clock.clone()));
    let engine = PolicyEngine::with_clock(
        vec![
            Box::new(Shared(budget.clone())),
            Box::new(DeniesAfterMidnight {
                clock: clock.clone(),
                budget: budget.clone(),
            }),
        ],
        clock.clone(),
    )
    .unwrap();

    let late = engine.evaluate(&hosting_intent(700)).unwrap();
    assert_eq!(late.decision, Decision::Denied);
    assert_eq!(clock.now().date_naive().to_string(), "2024-11-06");
    assert_eq!(budget.spent_today().unwrap(), 500);

    let over = budget.validate(&hosting_intent(600)).unwrap();
    assert_eq!(over.decision, Decision::Denied);
    assert_eq!(budget.spent_today().unwrap(), 500);
}

#[test]
fn after_hours_payments_are_denied() {
    let clock = business_hours_clock();
    let engine = PolicyEngine::with_clock(
        vec![Box::new(TimeBasedPolicy::new(clock.clone()))],
        clock.clone(),
    )
    .unwrap();

    assert!(engine.evaluate(&hosting_intent(10)).unwrap().is_approved());

    clock.advance(Duration::hours(9));
    let late = engine.evaluate(&hosting_intent(10)).unwrap();
    assert_eq!(late.decision, Decision::Denied);
    assert!(late.reason.unwrap().contains("business hours"));
}

#[test]
fn engine_from_yaml_config() {
    let yaml = r#"
policies:
  - kind: max_amount
    limit: 2000
  - kind: category
    allowed: [software, services]
  - kind: threshold
    threshold: 1000
"#;
    let config = GuardrailConfig::from_yaml_str(yaml).unwrap();
    let engine = PolicyEngine::from_config(&config, business_hours_clock()).unwrap();

    let mut services = hosting_intent(1200);
    services.category = Category::Services;
    let result = engine.evaluate(&services).unwrap();
    assert_eq!(result.decision, Decision::RequiresHumanApproval);
    assert_eq!(
        result.outcome,
        Outcome::RequiresApproval {
            policies: vec!["HumanApprovalThreshold".into()]
        }
    );
}

// =========================================================
// Concurrency
// =========================================================

#[test]
fn concurrent_submissions_of_one_key_commit_once() {
    let engine = Arc::new(amount_and_category_engine());
    let intent = Arc::new(hosting_intent(100));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let engine = engine.clone();
            let intent = intent.clone();
            thread::spawn(move || engine.evaluate(&intent).unwrap())
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let approved = results.iter().filter(|r| r.is_approved()).count();
    let duplicates = results
        .iter()
        .filter(|r| r.outcome == Outcome::DuplicateRequest)
        .count();

    assert_eq!(approved, 1);
    assert_eq!(duplicates, 15);
    assert!(engine
        .idempotency_guard()
        .has_processed(&intent.idempotency_key)
        .unwrap());
}

/// Denies the first intent it sees after a pause, approves the rest.
struct SlowFirstDenial {
    seen: AtomicBool,
}

impl Policy for SlowFirstDenial {
    fn name(&self) -> &str {
        "SlowFirstDenial"
    }

    fn validate(&self, _intent: &PaymentIntent) -> Result<PolicyVerdict, PolicyError> {
        if self.seen.swap(true, Ordering::SeqCst) {
            return Ok(PolicyVerdict::approve());
        }
        thread::sleep(StdDuration::from_millis(100));
        Ok(PolicyVerdict::deny("first attempt rejected"))
    }
}

#[test]
fn same_key_waits_for_a_denied_evaluation_then_runs() {
    let engine = Arc::new(
        PolicyEngine::with_clock(
            vec![Box::new(SlowFirstDenial {
                seen: AtomicBool::new(false),
            })],
            business_hours_clock(),
        )
        .unwrap(),
    );
    let intent = Arc::new(hosting_intent(100));

    let first = {
        let engine = engine.clone();
        let intent = intent.clone();
        thread::spawn(move || engine.evaluate(&intent).unwrap())
    };
    thread::sleep(StdDuration::from_millis(20));
    let second = {
        let engine = engine.clone();
        let intent = intent.clone();
        thread::spawn(move || engine.evaluate(&intent).unwrap())
    };

    let results = [first.join().unwrap(), second.join().unwrap()];
    assert!(results.iter().all(|r| r.outcome != Outcome::DuplicateRequest));
    assert_eq!(results.iter().filter(|r| r.is_approved()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| r.outcome
                == Outcome::PolicyViolation {
                    policy: "SlowFirstDenial".into()
                })
            .count(),
        1
    );
    assert!(engine
        .idempotency_guard()
        .has_processed(&intent.idempotency_key)
        .unwrap());
}

#[test]
fn concurrent_spend_never_exceeds_the_budget() {
    let clock = business_hours_clock();
    let budget = Arc::new(DailyBudgetPolicy::new(1000, clock.clone()));
    let engine = Arc::new(
        PolicyEngine::with_clock(vec![Box::new(Shared(budget.clone()))], clock).unwrap(),
    );

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let engine = engine.clone();
            thread::spawn(move || engine.evaluate(&hosting_intent(100)).unwrap())
        })
        .collect();

    let approved = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|r| r.is_approved())
        .count();

    assert_eq!(approved, 10);
    assert_eq!(budget.spent_today().unwrap(), 1000);
}

#[test]
fn human_reviewer_can_extend_the_trail() {
    let engine = PolicyEngine::with_clock(
        vec![Box::new(ThresholdPolicy::new(100))],
        business_hours_clock(),
    )
    .unwrap();
    let mut result = engine.evaluate(&hosting_intent(300)).unwrap();
    assert!(result.requires_human_approval());

    let before = result.audit_trail.len();
    result.audit_trail.record_human(
        Utc::now(),
        "Escalation approved",
        Some("finance-lead".to_string()),
    );
    assert_eq!(result.audit_trail.len(), before + 1);
    assert_eq!(
        result.audit_trail.last().unwrap().actor,
        sap_policy::AuditActor::Human
    );
}

#[test]
fn shipped_example_config_builds() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../config/guardrails.example.yaml");
    let config = GuardrailConfig::load(&path).unwrap();
    let engine = PolicyEngine::from_config(&config, business_hours_clock()).unwrap();
    assert_eq!(engine.policies().count(), 5);
}
