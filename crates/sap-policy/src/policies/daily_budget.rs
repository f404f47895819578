// Running-spend guardrail.
//
// Spend is recorded when the policy accepts an intent, before the payment
// has executed. The engine calls `rollback` if a later policy denies, and
// the execution side can `refund` a payment that failed downstream.
//
// Each acceptance is remembered per idempotency key for the current UTC
// day only. A rollover forgets them, so a late rollback or refund can never
// take an earlier day's amount out of the new day's spend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::clock::Clock;
use crate::decision::PolicyVerdict;
use crate::error::PolicyError;
use crate::intent::PaymentIntent;
use crate::policy::Policy;

#[derive(Debug)]
struct BudgetState {
    spent_today: u64,
    reset_date: NaiveDate,
    /// Amount accepted today, by idempotency key.
    reserved: HashMap<String, u64>,
}

/// Denies a payment that would push today's cumulative spend past a limit.
pub struct DailyBudgetPolicy {
    limit: u64,
    clock: Arc<dyn Clock>,
    state: Mutex<BudgetState>,
}

impl DailyBudgetPolicy {
    pub fn new(limit: u64, clock: Arc<dyn Clock>) -> Self {
        let today = clock.now().date_naive();
        Self {
            limit,
            clock,
            state: Mutex::new(BudgetState {
                spent_today: 0,
                reset_date: today,
                reserved: HashMap::new(),
            }),
        }
    }

    /// Amount recorded against today's budget.
    pub fn spent_today(&self) -> Result<u64, PolicyError> {
        Ok(self.lock_current()?.spent_today)
    }

    /// Give back the spend accepted today under `idempotency_key`, e.g.
    /// after a failed execution. Returns the amount released, which is zero
    /// when the key was accepted on an earlier day or never accepted.
    pub fn refund(&self, idempotency_key: &str) -> Result<u64, PolicyError> {
        let mut state = self.lock_current()?;
        let amount = state.reserved.remove(idempotency_key).unwrap_or(0);
        state.spent_today = state.spent_today.saturating_sub(amount);
        if amount > 0 {
            tracing::debug!(policy = self.name(), idempotency_key, amount, "daily budget refunded");
        }
        Ok(amount)
    }

    /// Zero today's spend.
    pub fn reset(&self) -> Result<(), PolicyError> {
        let mut state = self.lock_current()?;
        state.spent_today = 0;
        state.reserved.clear();
        Ok(())
    }

    /// Lock the state, rolling it over first if the date has changed.
    fn lock_current(&self) -> Result<MutexGuard<'_, BudgetState>, PolicyError> {
        let today = self.clock.now().date_naive();
        let mut state = self
            .state
            .lock()
            .map_err(|_| PolicyError::poisoned(self.name()))?;
        if state.reset_date != today {
            tracing::debug!(
                policy = self.name(),
                previous = %state.reset_date,
                %today,
                "daily budget rolled over"
            );
            state.spent_today = 0;
            state.reset_date = today;
            state.reserved.clear();
        }
        Ok(state)
    }
}

impl Policy for DailyBudgetPolicy {
    fn name(&self) -> &str {
        "DailyBudgetLimit"
    }

    fn validate(&self, intent: &PaymentIntent) -> Result<PolicyVerdict, PolicyError> {
        let mut state = self.lock_current()?;
        let remaining = self.limit.saturating_sub(state.spent_today);
        if intent.amount > remaining {
            return Ok(PolicyVerdict::deny(format!(
                "Daily budget exceeded. Remaining: {}",
                remaining
            )));
        }
        state.spent_today += intent.amount;
        *state
            .reserved
            .entry(intent.idempotency_key.clone())
            .or_insert(0) += intent.amount;
        Ok(PolicyVerdict::approve())
    }

    fn rollback(&self, intent: &PaymentIntent) -> Result<(), PolicyError> {
        self.refund(&intent.idempotency_key).map(|_| ())
    }

    fn describe(&self) -> String {
        format!("{} (limit {} per UTC day)", self.name(), self.limit)
    }
}
