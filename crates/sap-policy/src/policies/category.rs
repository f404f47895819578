use std::collections::BTreeSet;

use crate::decision::PolicyVerdict;
use crate::error::PolicyError;
use crate::intent::{Category, PaymentIntent};
use crate::policy::Policy;

/// Categories an agent may spend on without further configuration.
pub(crate) const DEFAULT_ALLOWED: [Category; 3] =
    [Category::Equipment, Category::Software, Category::Travel];

/// Denies spend categories outside an allow-list.
#[derive(Debug, Clone)]
pub struct CategoryPolicy {
    allowed: BTreeSet<Category>,
}

impl CategoryPolicy {
    /// Allow equipment, software and travel.
    pub fn new() -> Self {
        Self::with_allowed(DEFAULT_ALLOWED)
    }

    pub fn with_allowed(allowed: impl IntoIterator<Item = Category>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn allows(&self, category: Category) -> bool {
        self.allowed.contains(&category)
    }
}

impl Default for CategoryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for CategoryPolicy {
    fn name(&self) -> &str {
        "AllowedCategories"
    }

    fn validate(&self, intent: &PaymentIntent) -> Result<PolicyVerdict, PolicyError> {
        if !self.allows(intent.category) {
            return Ok(PolicyVerdict::deny(format!(
                "Category '{}' is not in the approved list.",
                intent.category
            )));
        }
        Ok(PolicyVerdict::approve())
    }

    fn describe(&self) -> String {
        let allowed: Vec<&str> = self.allowed.iter().map(Category::as_str).collect();
        format!("{} ({})", self.name(), allowed.join(", "))
    }
}
