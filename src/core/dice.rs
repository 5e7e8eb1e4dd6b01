use std::{fmt, str::FromStr};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{core::errors::LedgerError, domain::DiceRoll};

pub const MAX_DICE: u32 = 100;
pub const MIN_SIDES: u32 = 2;
pub const MAX_SIDES: u32 = 1000;

/// Parsed `NdS` dice expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
}

impl DiceExpr {
    pub fn new(count: u32, sides: u32) -> Result<Self, LedgerError> {
        if !(1..=MAX_DICE).contains(&count) {
            return Err(LedgerError::Validation(format!(
                "dice count must be between 1 and {} (got {})",
                MAX_DICE, count
            )));
        }
        if !(MIN_SIDES..=MAX_SIDES).contains(&sides) {
            return Err(LedgerError::Validation(format!(
                "dice must have between {} and {} sides (got {})",
                MIN_SIDES, MAX_SIDES, sides
            )));
        }
        Ok(Self { count, sides })
    }
}

impl FromStr for DiceExpr {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        let invalid = || {
            LedgerError::Validation(format!("`{}` is not a dice expression like 3d6", s.trim()))
        };
        let (count, sides) = trimmed.split_once('d').ok_or_else(invalid)?;
        let count = if count.is_empty() {
            1
        } else {
            count.parse::<u32>().map_err(|_| invalid())?
        };
        let sides = sides.parse::<u32>().map_err(|_| invalid())?;
        Self::new(count, sides)
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// Random source for dice rolls. Seeded rollers repeat their sequence.
#[derive(Debug, Clone)]
pub struct DiceRoller {
    rng: StdRng,
}

impl DiceRoller {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Builds a roller from an optional configured seed.
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_default()
    }

    pub fn roll(&mut self, expr: DiceExpr) -> DiceRoll {
        let faces = (0..expr.count)
            .map(|_| self.rng.gen_range(1..=expr.sides))
            .collect();
        DiceRoll::new(expr.count, expr.sides, faces)
    }
}

impl Default for DiceRoller {
    fn default() -> Self {
        Self::new()
    }
}
