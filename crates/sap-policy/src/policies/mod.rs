//! Built-in guardrail rules.

pub(crate) mod category;
mod daily_budget;
mod max_amount;
mod threshold;
pub(crate) mod time_window;

pub use category::CategoryPolicy;
pub use daily_budget::DailyBudgetPolicy;
pub use max_amount::MaxAmountPolicy;
pub use threshold::ThresholdPolicy;
pub use time_window::TimeBasedPolicy;
