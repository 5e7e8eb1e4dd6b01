use std::fmt;

use crate::domain::common::{Displayable, NamedEntity};

/// A combat participant and its initiative score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatActor {
    pub name: String,
    pub initiative: i32,
}

impl CombatActor {
    pub fn new(name: impl Into<String>, initiative: i32) -> Self {
        Self {
            name: name.into(),
            initiative,
        }
    }
}

impl NamedEntity for CombatActor {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for CombatActor {
    fn display_label(&self) -> String {
        format!("Actor {} ({})", self.name, self.initiative)
    }
}

/// Lifecycle of a combat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatPhase {
    Forming,
    Active,
    Ended,
}

impl fmt::Display for CombatPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CombatPhase::Forming => "forming",
            CombatPhase::Active => "active",
            CombatPhase::Ended => "ended",
        };
        f.write_str(label)
    }
}
