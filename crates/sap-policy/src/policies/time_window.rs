use std::sync::Arc;

use chrono::Timelike;

use crate::clock::Clock;
use crate::decision::PolicyVerdict;
use crate::error::PolicyError;
use crate::intent::PaymentIntent;
use crate::policy::Policy;

pub(crate) const DEFAULT_START_HOUR: u32 = 9;
pub(crate) const DEFAULT_END_HOUR: u32 = 17;

/// Denies payments outside a UTC business-hours window `[start, end)`.
pub struct TimeBasedPolicy {
    clock: Arc<dyn Clock>,
    start_hour: u32,
    end_hour: u32,
}

impl TimeBasedPolicy {
    /// 09:00 to 17:00 UTC.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
        }
    }

    /// Custom window. Requires `start_hour < end_hour <= 24`.
    pub fn with_window(
        clock: Arc<dyn Clock>,
        start_hour: u32,
        end_hour: u32,
    ) -> Result<Self, PolicyError> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(PolicyError::invalid_config(format!(
                "business-hours window {}..{} is empty or out of range",
                start_hour, end_hour
            )));
        }
        Ok(Self {
            clock,
            start_hour,
            end_hour,
        })
    }

    fn is_business_hours(&self) -> bool {
        let hour = self.clock.now().hour();
        hour >= self.start_hour && hour < self.end_hour
    }
}

impl Policy for TimeBasedPolicy {
    fn name(&self) -> &str {
        "TimeBasedLimit"
    }

    fn validate(&self, _intent: &PaymentIntent) -> Result<PolicyVerdict, PolicyError> {
        if !self.is_business_hours() {
            return Ok(PolicyVerdict::deny(format!(
                "Payments are only allowed during business hours ({}:00 - {}:00 UTC)",
                self.start_hour, self.end_hour
            )));
        }
        Ok(PolicyVerdict::approve())
    }

    fn describe(&self) -> String {
        format!(
            "{} ({:02}:00-{:02}:00 UTC)",
            self.name(),
            self.start_hour,
            self.end_hour
        )
    }
}
