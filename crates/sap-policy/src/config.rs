// config.rs - Guardrail chain configuration.
//
// The chain lives in a YAML file (by default `.sap/guardrails.yaml`):
//
//   policies:
//     - kind: max_amount
//       limit: 1000
//     - kind: category
//       allowed: [equipment, software, travel]
//     - kind: time_window
//       start_hour: 9
//       end_hour: 17
//     - kind: daily_budget
//       limit: 5000
//     - kind: threshold
//       threshold: 750
//
// Order in the file is evaluation order. The chain is fixed once built.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::PolicyError;
use crate::intent::Category;
use crate::policies::category::DEFAULT_ALLOWED;
use crate::policies::time_window::{DEFAULT_END_HOUR, DEFAULT_START_HOUR};
use crate::policies::{
    CategoryPolicy, DailyBudgetPolicy, MaxAmountPolicy, ThresholdPolicy, TimeBasedPolicy,
};
use crate::policy::Policy;

/// Ordered list of guardrails to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailConfig {
    #[serde(default)]
    pub policies: Vec<PolicySpec>,
}

/// One guardrail and its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicySpec {
    MaxAmount {
        limit: u64,
    },
    Category {
        #[serde(default = "default_allowed")]
        allowed: Vec<Category>,
    },
    TimeWindow {
        #[serde(default = "default_start_hour")]
        start_hour: u32,
        #[serde(default = "default_end_hour")]
        end_hour: u32,
    },
    DailyBudget {
        limit: u64,
    },
    Threshold {
        threshold: u64,
    },
}

// Serde default functions
fn default_allowed() -> Vec<Category> {
    DEFAULT_ALLOWED.to_vec()
}

fn default_start_hour() -> u32 {
    DEFAULT_START_HOUR
}

fn default_end_hour() -> u32 {
    DEFAULT_END_HOUR
}

impl Default for GuardrailConfig {
    /// Hard cap of 1000 plus the default category allow-list.
    fn default() -> Self {
        Self {
            policies: vec![
                PolicySpec::MaxAmount { limit: 1000 },
                PolicySpec::Category {
                    allowed: default_allowed(),
                },
            ],
        }
    }
}

impl GuardrailConfig {
    /// Load a guardrail config from a YAML file.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let content = fs::read_to_string(path).map_err(|source| PolicyError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load from file if it exists, otherwise use [`GuardrailConfig::default`].
    pub fn load_or_default(path: &Path) -> Result<Self, PolicyError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no guardrail config, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self, PolicyError> {
        let config: GuardrailConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, PolicyError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject parameters that would make a guardrail meaningless.
    pub fn validate(&self) -> Result<(), PolicyError> {
        for (index, spec) in self.policies.iter().enumerate() {
            spec.validate().map_err(|reason| {
                PolicyError::invalid_config(format!("policies[{}]: {}", index, reason))
            })?;
        }
        Ok(())
    }

    /// Instantiate the chain in file order. Time-aware policies share `clock`.
    pub fn build(&self, clock: Arc<dyn Clock>) -> Result<Vec<Box<dyn Policy>>, PolicyError> {
        self.validate()?;
        self.policies
            .iter()
            .map(|spec| spec.build(clock.clone()))
            .collect()
    }
}

impl PolicySpec {
    fn validate(&self) -> Result<(), String> {
        match self {
            PolicySpec::MaxAmount { limit } | PolicySpec::DailyBudget { limit } if *limit == 0 => {
                Err("limit must be greater than zero".to_string())
            }
            PolicySpec::Threshold { threshold } if *threshold == 0 => {
                Err("threshold must be greater than zero".to_string())
            }
            PolicySpec::Category { allowed } if allowed.is_empty() => {
                Err("allowed categories must not be empty".to_string())
            }
            PolicySpec::TimeWindow {
                start_hour,
                end_hour,
            } if start_hour >= end_hour || *end_hour > 24 => Err(format!(
                "business-hours window {}..{} is empty or out of range",
                start_hour, end_hour
            )),
            _ => Ok(()),
        }
    }

    fn build(&self, clock: Arc<dyn Clock>) -> Result<Box<dyn Policy>, PolicyError> {
        let policy: Box<dyn Policy> = match self {
            PolicySpec::MaxAmount { limit } => Box::new(MaxAmountPolicy::new(*limit)),
            PolicySpec::Category { allowed } => {
                Box::new(CategoryPolicy::with_allowed(allowed.iter().copied()))
            }
            PolicySpec::TimeWindow {
                start_hour,
                end_hour,
            } => Box::new(TimeBasedPolicy::with_window(clock, *start_hour, *end_hour)?),
            PolicySpec::DailyBudget { limit } => Box::new(DailyBudgetPolicy::new(*limit, clock)),
            PolicySpec::Threshold { threshold } => Box::new(ThresholdPolicy::new(*threshold)),
        };
        Ok(policy)
    }
}
