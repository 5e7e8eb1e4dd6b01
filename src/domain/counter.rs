use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::NamedEntity;

/// Lifetime gold earned; `consumed` holds downward adjustments.
pub const TOTAL_EARNED: &str = "TotalEarned";
/// Gold spent on anything that is not an item stack.
pub const MISC_SPENDING: &str = "MiscSpending";

/// A named running total kept apart from item stacks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Counter {
    pub name: String,
    pub initial: i64,
    #[serde(default)]
    pub consumed: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Counter {
    pub fn new(name: impl Into<String>, initial: i64, notes: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            initial,
            consumed: 0,
            notes: notes.map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn remaining(&self) -> i64 {
        self.initial.saturating_sub(self.consumed)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl NamedEntity for Counter {
    fn name(&self) -> &str {
        &self.name
    }
}
